pub mod engine;
pub mod error;
pub mod validation;

pub use engine::{QuestionField, ScoreAllocationEngine};
pub use error::AllocationError;
pub use validation::validate_draft;
