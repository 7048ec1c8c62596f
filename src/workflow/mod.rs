pub mod observation;
pub mod question_flow;

pub use observation::{ObservationController, ObservationOutcome, ObserverState};
pub use question_flow::QuestionFlow;
