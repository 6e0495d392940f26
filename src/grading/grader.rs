use crate::draft::{EvaluationDraft, Question, QuestionKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One student response, referencing a question by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub question_index: usize,
    pub response: String,
}

/// Grading outcome for a single answer.
#[derive(Debug, Clone, Serialize)]
pub struct GradedAnswer {
    pub question_index: usize,
    pub correct: bool,
    pub points_earned: i64,
    pub points_possible: i64,
    /// 1.0 for exact-match grading; low for answers a human still has to
    /// look at.
    pub confidence: f64,
    pub needs_review: bool,
}

/// Difficulty inferred from how the attempt went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Low => write!(f, "low"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::High => write!(f, "high"),
        }
    }
}

/// How urgently an instructor should look at this attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPriority {
    Low,
    Medium,
    Urgent,
}

impl fmt::Display for ReviewPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewPriority::Low => write!(f, "low"),
            ReviewPriority::Medium => write!(f, "medium"),
            ReviewPriority::Urgent => write!(f, "urgent"),
        }
    }
}

/// Full grading report for one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub answers: Vec<GradedAnswer>,
    pub points_earned: i64,
    /// Sum of points over all questions, answered or not.
    pub points_possible: i64,
    /// Points earned as a percentage of points possible, 2-decimal rounding.
    pub percent_correct: f64,
    pub correct_count: usize,
    /// Mean answer confidence; 0.5 when nothing was answered.
    pub confidence: f64,
    pub difficulty: Difficulty,
    /// Up to three areas (topic, or statement when untagged) answered wrong.
    pub weak_areas: Vec<String>,
    /// Up to three areas answered right with high confidence.
    pub strong_areas: Vec<String>,
    pub needs_review: bool,
    pub priority: ReviewPriority,
}

/// Grade one attempt against the evaluation's questions.
///
/// Closed questions (single choice, true/false) grade by exact comparison:
/// full points or zero. Open answers are never auto-scored; they earn zero
/// here and come back flagged for manual review. Answers referencing an
/// out-of-range question are skipped with a warning.
pub fn grade_attempt(draft: &EvaluationDraft, answers: &[AttemptAnswer]) -> AttemptReport {
    let mut graded = Vec::new();
    let mut weak_areas = Vec::new();
    let mut strong_areas = Vec::new();

    for answer in answers {
        let Some(question) = draft.questions.get(answer.question_index) else {
            tracing::warn!(
                question_index = answer.question_index,
                question_count = draft.questions.len(),
                "skipping answer for unknown question"
            );
            continue;
        };

        let result = grade_answer(question, answer);

        if result.correct {
            if result.confidence > 0.8 {
                strong_areas.push(area_label(question));
            }
        } else if !result.needs_review {
            weak_areas.push(area_label(question));
        }

        graded.push(result);
    }

    let points_possible: i64 = draft.questions.iter().map(|q| q.points).sum();
    let points_earned: i64 = graded.iter().map(|a| a.points_earned).sum();
    let correct_count = graded.iter().filter(|a| a.correct).count();

    let percent_correct = if points_possible > 0 {
        round2(points_earned as f64 / points_possible as f64 * 100.0)
    } else {
        0.0
    };

    let confidence = if graded.is_empty() {
        0.5
    } else {
        round2(graded.iter().map(|a| a.confidence).sum::<f64>() / graded.len() as f64)
    };

    // Difficulty keys off the share of answered questions got right, not the
    // point-weighted percent.
    let answered_percent = if graded.is_empty() {
        0.0
    } else {
        correct_count as f64 / graded.len() as f64 * 100.0
    };
    let difficulty = if answered_percent >= 80.0 {
        Difficulty::Low
    } else if answered_percent >= 50.0 {
        Difficulty::Medium
    } else {
        Difficulty::High
    };

    let needs_review = graded.iter().any(|a| a.needs_review);
    let priority = if needs_review || confidence < 0.5 {
        ReviewPriority::Urgent
    } else if confidence < 0.75 {
        ReviewPriority::Medium
    } else {
        ReviewPriority::Low
    };

    weak_areas.truncate(3);
    strong_areas.truncate(3);

    tracing::debug!(
        points_earned,
        points_possible,
        percent_correct,
        %priority,
        "attempt graded"
    );

    AttemptReport {
        answers: graded,
        points_earned,
        points_possible,
        percent_correct,
        correct_count,
        confidence,
        difficulty,
        weak_areas,
        strong_areas,
        needs_review,
        priority,
    }
}

fn grade_answer(question: &Question, answer: &AttemptAnswer) -> GradedAnswer {
    if question.kind.is_closed() {
        let correct = responses_match(&answer.response, &question.correct_answer, question.kind);
        GradedAnswer {
            question_index: answer.question_index,
            correct,
            points_earned: if correct { question.points } else { 0 },
            points_possible: question.points,
            confidence: 1.0,
            needs_review: false,
        }
    } else {
        // Open answers wait for the instructor (or an external analysis
        // service); no points awarded here.
        GradedAnswer {
            question_index: answer.question_index,
            correct: false,
            points_earned: 0,
            points_possible: question.points,
            confidence: 0.3,
            needs_review: true,
        }
    }
}

/// Compare a response against the correct answer for a closed question.
fn responses_match(response: &str, correct: &str, kind: QuestionKind) -> bool {
    if kind == QuestionKind::TrueFalse {
        // Normalize both sides to a boolean before comparing
        return normalize_bool(response) == normalize_bool(correct);
    }

    // Single choice: exact comparison, case-insensitive
    response.trim().to_lowercase() == correct.trim().to_lowercase()
}

fn normalize_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "1"
    )
}

fn area_label(question: &Question) -> String {
    question
        .topic
        .clone()
        .unwrap_or_else(|| question.statement.clone())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(kind: QuestionKind, correct: &str, points: i64) -> Question {
        Question {
            statement: format!("{} question", kind),
            kind,
            choices: if kind == QuestionKind::SingleChoice {
                vec!["A".to_string(), "B".to_string(), "C".to_string()]
            } else {
                vec![]
            },
            correct_answer: correct.to_string(),
            points,
            topic: None,
        }
    }

    fn draft_with(questions: Vec<Question>) -> EvaluationDraft {
        EvaluationDraft {
            title: "Test".to_string(),
            questions,
            ..Default::default()
        }
    }

    fn answer(index: usize, response: &str) -> AttemptAnswer {
        AttemptAnswer {
            question_index: index,
            response: response.to_string(),
        }
    }

    #[test]
    fn test_single_choice_exact_match() {
        let draft = draft_with(vec![question(QuestionKind::SingleChoice, "B", 10)]);
        let report = grade_attempt(&draft, &[answer(0, "B")]);

        assert_eq!(report.points_earned, 10);
        assert_eq!(report.correct_count, 1);
        assert!(!report.needs_review);
    }

    #[test]
    fn test_single_choice_case_insensitive() {
        let draft = draft_with(vec![question(QuestionKind::SingleChoice, "Paris", 10)]);
        let report = grade_attempt(&draft, &[answer(0, "  paris ")]);
        assert_eq!(report.correct_count, 1);
    }

    #[test]
    fn test_single_choice_wrong() {
        let draft = draft_with(vec![question(QuestionKind::SingleChoice, "B", 10)]);
        let report = grade_attempt(&draft, &[answer(0, "C")]);

        assert_eq!(report.points_earned, 0);
        assert_eq!(report.correct_count, 0);
    }

    #[test]
    fn test_true_false_token_normalization() {
        let draft = draft_with(vec![question(QuestionKind::TrueFalse, "true", 5)]);

        for response in ["true", "True", "T", "yes", "y", "1"] {
            let report = grade_attempt(&draft, &[answer(0, response)]);
            assert_eq!(report.correct_count, 1, "response {:?}", response);
        }

        for response in ["false", "no", "0", "maybe"] {
            let report = grade_attempt(&draft, &[answer(0, response)]);
            assert_eq!(report.correct_count, 0, "response {:?}", response);
        }
    }

    #[test]
    fn test_true_false_unknown_token_reads_as_false() {
        // Correct answer "falso" isn't a recognized true token, so it
        // normalizes to false and matches a "false" response.
        let draft = draft_with(vec![question(QuestionKind::TrueFalse, "falso", 5)]);
        let report = grade_attempt(&draft, &[answer(0, "no")]);
        assert_eq!(report.correct_count, 1);
    }

    #[test]
    fn test_open_answers_flagged_not_scored() {
        let draft = draft_with(vec![question(QuestionKind::ShortAnswer, "4", 20)]);
        let report = grade_attempt(&draft, &[answer(0, "4")]);

        assert_eq!(report.points_earned, 0);
        assert!(report.needs_review);
        assert_eq!(report.priority, ReviewPriority::Urgent);
        assert_eq!(report.answers[0].confidence, 0.3);
    }

    #[test]
    fn test_points_possible_counts_unanswered() {
        let draft = draft_with(vec![
            question(QuestionKind::SingleChoice, "A", 40),
            question(QuestionKind::SingleChoice, "B", 60),
        ]);
        let report = grade_attempt(&draft, &[answer(0, "A")]);

        assert_eq!(report.points_earned, 40);
        assert_eq!(report.points_possible, 100);
        assert_eq!(report.percent_correct, 40.0);
    }

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        let draft = draft_with(vec![
            question(QuestionKind::SingleChoice, "A", 1),
            question(QuestionKind::SingleChoice, "B", 2),
        ]);
        let report = grade_attempt(&draft, &[answer(0, "A")]);
        // 1/3 -> 33.33
        assert_eq!(report.percent_correct, 33.33);
    }

    #[test]
    fn test_out_of_range_answer_skipped() {
        let draft = draft_with(vec![question(QuestionKind::SingleChoice, "A", 10)]);
        let report = grade_attempt(&draft, &[answer(0, "A"), answer(9, "B")]);

        assert_eq!(report.answers.len(), 1);
        assert_eq!(report.points_earned, 10);
    }

    #[test]
    fn test_empty_attempt() {
        let draft = draft_with(vec![question(QuestionKind::SingleChoice, "A", 10)]);
        let report = grade_attempt(&draft, &[]);

        assert_eq!(report.points_earned, 0);
        assert_eq!(report.confidence, 0.5);
        assert_eq!(report.difficulty, Difficulty::High);
        assert!(!report.needs_review);
    }

    #[test]
    fn test_difficulty_thresholds() {
        let questions: Vec<Question> = (0..5)
            .map(|_| question(QuestionKind::SingleChoice, "A", 10))
            .collect();
        let draft = draft_with(questions);

        // 5/5 correct -> low
        let all_right: Vec<AttemptAnswer> = (0..5).map(|i| answer(i, "A")).collect();
        assert_eq!(grade_attempt(&draft, &all_right).difficulty, Difficulty::Low);

        // 3/5 correct -> medium
        let mixed: Vec<AttemptAnswer> = (0..5)
            .map(|i| answer(i, if i < 3 { "A" } else { "B" }))
            .collect();
        assert_eq!(grade_attempt(&draft, &mixed).difficulty, Difficulty::Medium);

        // 1/5 correct -> high
        let mostly_wrong: Vec<AttemptAnswer> = (0..5)
            .map(|i| answer(i, if i < 1 { "A" } else { "B" }))
            .collect();
        assert_eq!(
            grade_attempt(&draft, &mostly_wrong).difficulty,
            Difficulty::High
        );
    }

    #[test]
    fn test_priority_low_for_clean_closed_attempt() {
        let draft = draft_with(vec![question(QuestionKind::TrueFalse, "true", 10)]);
        let report = grade_attempt(&draft, &[answer(0, "true")]);
        assert_eq!(report.priority, ReviewPriority::Low);
    }

    #[test]
    fn test_weak_and_strong_areas_prefer_topic() {
        let mut right = question(QuestionKind::SingleChoice, "A", 10);
        right.topic = Some("ownership".to_string());
        let mut wrong = question(QuestionKind::SingleChoice, "A", 10);
        wrong.topic = Some("lifetimes".to_string());

        let draft = draft_with(vec![right, wrong]);
        let report = grade_attempt(&draft, &[answer(0, "A"), answer(1, "B")]);

        assert_eq!(report.strong_areas, vec!["ownership".to_string()]);
        assert_eq!(report.weak_areas, vec!["lifetimes".to_string()]);
    }

    #[test]
    fn test_areas_capped_at_three() {
        let questions: Vec<Question> = (0..6)
            .map(|_| question(QuestionKind::SingleChoice, "A", 5))
            .collect();
        let draft = draft_with(questions);
        let all_wrong: Vec<AttemptAnswer> = (0..6).map(|i| answer(i, "B")).collect();

        let report = grade_attempt(&draft, &all_wrong);
        assert_eq!(report.weak_areas.len(), 3);
    }
}
