pub mod payload;
pub mod question;
pub mod session;

pub use payload::{ExtractedPayload, RegionSnapshot};
pub use question::{Correction, OptionSet, QuestionKind, QuestionRequest};
pub use session::ObservationSession;
