use super::error::AllocationError;
use crate::draft::{EvaluationDraft, Question, QuestionKind, SubmissionPayload};
use crate::preview::{PreviewNotifier, PreviewSnapshot};

/// A single field mutation on one question, as issued by the authoring form.
#[derive(Debug, Clone)]
pub enum QuestionField {
    Statement(String),
    Kind(QuestionKind),
    Points(i64),
    Choices(Vec<String>),
    Topic(Option<String>),
    CorrectAnswer(String),
}

/// Maintains the scored question list of an evaluation draft.
///
/// Derived values (`total_points`, `exceeds_max`, `utilization_percent`) are
/// recomputed on every read; nothing is cached. The invariant enforced before
/// submission is `sum(points) <= max_score`: under-allocation is allowed,
/// over-allocation is not. Single-threaded: each mutation runs to completion
/// before the next is processed.
///
/// When a [`PreviewNotifier`] is attached, every mutation (re)schedules a
/// debounced preview snapshot; rapid edits coalesce into one notification.
pub struct ScoreAllocationEngine {
    draft: EvaluationDraft,
    preview: Option<PreviewNotifier>,
}

impl ScoreAllocationEngine {
    pub fn new(draft: EvaluationDraft) -> Self {
        Self {
            draft,
            preview: None,
        }
    }

    /// Attach a preview notifier. Requires a tokio runtime once mutations
    /// start flowing; engines built with [`new`](Self::new) never touch one.
    pub fn with_preview(draft: EvaluationDraft, preview: PreviewNotifier) -> Self {
        Self {
            draft,
            preview: Some(preview),
        }
    }

    pub fn draft(&self) -> &EvaluationDraft {
        &self.draft
    }

    /// Hand the draft back, dropping any pending preview notification.
    pub fn into_draft(self) -> EvaluationDraft {
        self.draft
    }

    /// Sum of points across all questions.
    pub fn total_points(&self) -> i64 {
        self.draft.questions.iter().map(|q| q.points).sum()
    }

    pub fn exceeds_max(&self) -> bool {
        self.total_points() > self.draft.max_score
    }

    /// Allocated points as a percentage of the maximum score.
    ///
    /// Raw value: may exceed 100 when over-allocated. Display code clamps.
    pub fn utilization_percent(&self) -> f64 {
        if self.draft.max_score > 0 {
            self.total_points() as f64 / self.draft.max_score as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Append a blank question. Does not touch `max_score`.
    pub fn add_question(&mut self) -> &Question {
        self.draft.questions.push(Question::blank());
        tracing::debug!(count = self.draft.questions.len(), "question added");
        self.touch();
        self.draft.questions.last().expect("just pushed")
    }

    /// Remove the question at `index`. Out-of-range is a silent no-op.
    /// Remaining points are not rebalanced.
    pub fn remove_question(&mut self, index: usize) {
        if index < self.draft.questions.len() {
            self.draft.questions.remove(index);
            self.touch();
        }
    }

    /// Apply one field mutation to the question at `index`.
    ///
    /// No cross-field validation: changing the kind away from
    /// `single_choice` leaves the choices in place.
    pub fn set_question_field(
        &mut self,
        index: usize,
        field: QuestionField,
    ) -> Result<(), AllocationError> {
        let len = self.draft.questions.len();
        let question = self
            .draft
            .questions
            .get_mut(index)
            .ok_or(AllocationError::IndexOutOfRange { index, len })?;

        match field {
            QuestionField::Statement(v) => question.statement = v,
            QuestionField::Kind(v) => question.kind = v,
            QuestionField::Points(v) => question.points = v,
            QuestionField::Choices(v) => question.choices = v,
            QuestionField::Topic(v) => question.topic = v,
            QuestionField::CorrectAnswer(v) => question.correct_answer = v,
        }

        self.touch();
        Ok(())
    }

    /// Append an empty choice to the question at `question_index`.
    pub fn add_choice(&mut self, question_index: usize) -> Result<(), AllocationError> {
        let len = self.draft.questions.len();
        let question = self
            .draft
            .questions
            .get_mut(question_index)
            .ok_or(AllocationError::IndexOutOfRange {
                index: question_index,
                len,
            })?;

        question.choices.push(String::new());
        self.touch();
        Ok(())
    }

    /// Remove one choice from the question at `question_index`.
    ///
    /// The two-choice floor is form policy, not enforced here.
    pub fn remove_choice(
        &mut self,
        question_index: usize,
        choice_index: usize,
    ) -> Result<(), AllocationError> {
        let len = self.draft.questions.len();
        let question = self
            .draft
            .questions
            .get_mut(question_index)
            .ok_or(AllocationError::IndexOutOfRange {
                index: question_index,
                len,
            })?;

        if choice_index >= question.choices.len() {
            return Err(AllocationError::IndexOutOfRange {
                index: choice_index,
                len: question.choices.len(),
            });
        }

        question.choices.remove(choice_index);
        self.touch();
        Ok(())
    }

    pub fn set_max_score(&mut self, max_score: i64) {
        self.draft.max_score = max_score;
        self.touch();
    }

    /// Proportionally rescale all question points so they sum to
    /// `max_score`.
    ///
    /// Each question gets `round(points * max_score / total)`; ties round
    /// away from zero. The rounding residual is added entirely to the first
    /// question, even when that drives it negative or disproportionately
    /// high. No-op when there are no questions or no points allocated.
    /// Idempotent on an already-normalized set.
    pub fn normalize_points(&mut self) {
        let total = self.total_points();
        if self.draft.questions.is_empty() || total == 0 {
            return;
        }

        let factor = self.draft.max_score as f64 / total as f64;
        for question in &mut self.draft.questions {
            question.points = (question.points as f64 * factor).round() as i64;
        }

        let residual = self.draft.max_score - self.total_points();
        self.draft.questions[0].points += residual;

        tracing::debug!(
            factor,
            residual,
            max_score = self.draft.max_score,
            "points normalized"
        );
        self.touch();
    }

    /// Split `max_score` as evenly as possible across all questions.
    ///
    /// The first `max_score mod count` questions get one extra point, so the
    /// sum always lands exactly on `max_score`. No-op when there are no
    /// questions.
    pub fn distribute_evenly(&mut self) {
        let count = self.draft.questions.len() as i64;
        if count == 0 {
            return;
        }

        let base = self.draft.max_score.div_euclid(count);
        let remainder = self.draft.max_score.rem_euclid(count);
        for (i, question) in self.draft.questions.iter_mut().enumerate() {
            question.points = base + if (i as i64) < remainder { 1 } else { 0 };
        }

        tracing::debug!(base, remainder, "points distributed evenly");
        self.touch();
    }

    /// The allocation gate: fails iff the allocated points exceed
    /// `max_score`.
    ///
    /// On success returns the total score to persist: the allocated sum, or
    /// `max_score` when nothing is allocated yet (a zero-point draft resolves
    /// to full marks; intentional, mirrors the persisted-field fallback).
    pub fn validate_for_submission(&self) -> Result<i64, AllocationError> {
        let total_points = self.total_points();
        if total_points > self.draft.max_score {
            tracing::warn!(
                total_points,
                max_score = self.draft.max_score,
                "submission blocked: over-allocated"
            );
            return Err(AllocationError::ScoreExceedsMaximum {
                total_points,
                max_score: self.draft.max_score,
            });
        }

        Ok(if total_points != 0 {
            total_points
        } else {
            self.draft.max_score
        })
    }

    /// Run the gate and assemble the hand-off for the submission
    /// collaborator.
    pub fn submission_payload(&self) -> Result<SubmissionPayload, AllocationError> {
        let total_score = self.validate_for_submission()?;
        Ok(SubmissionPayload {
            questions: self.draft.questions.clone(),
            total_score,
        })
    }

    /// The plain data snapshot handed to the preview collaborator.
    pub fn snapshot(&self) -> PreviewSnapshot {
        PreviewSnapshot {
            title: self.draft.title.clone(),
            description: self.draft.description.clone(),
            kind: self.draft.kind,
            time_limit_minutes: self.draft.time_limit_minutes,
            total_score: self.total_points(),
            questions: self.draft.questions.clone(),
        }
    }

    // (Re)start the debounce window after a mutation.
    fn touch(&mut self) {
        if self.preview.is_some() {
            let snapshot = self.snapshot();
            if let Some(preview) = self.preview.as_mut() {
                preview.schedule(snapshot);
            }
        }
    }
}
