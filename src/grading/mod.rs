mod grader;

pub use grader::{
    grade_attempt, AttemptAnswer, AttemptReport, Difficulty, GradedAnswer, ReviewPriority,
};
