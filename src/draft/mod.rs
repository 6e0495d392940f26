mod storage;
mod types;

pub use storage::{load_draft, save_draft};
pub use types::{
    EvaluationDraft, EvaluationKind, EvaluationStatus, Question, QuestionKind, SubmissionPayload,
};
