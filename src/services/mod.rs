pub mod delivery;
pub mod extractor;
pub mod prompt;
pub mod rescan;
pub mod submission;

pub use delivery::{DeliveryGuard, DeliveryOutcome};
pub use extractor::extract;
pub use prompt::render_prompt;
pub use rescan::{find_candidate, Candidate, CandidateSource, RescanOutcome, Rescanner};
pub use submission::SubmissionDriver;
