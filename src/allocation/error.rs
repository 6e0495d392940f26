use thiserror::Error;

/// Errors produced by the score allocation engine.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The allocated points exceed the evaluation's maximum score.
    ///
    /// Recoverable: normalize, distribute evenly, or edit points by hand and
    /// retry. Both numbers travel together so callers can show them.
    #[error("allocated points {total_points} exceed the maximum score {max_score}")]
    ScoreExceedsMaximum { total_points: i64, max_score: i64 },

    /// A mutation was issued against a stale or removed index.
    ///
    /// Programmer error in the calling form, fatal to the call. State is
    /// left unchanged.
    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
