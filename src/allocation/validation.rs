use crate::config::Limits;
use crate::draft::{EvaluationDraft, QuestionKind};

/// Validate a draft against the form-level submission requirements.
/// Returns all validation errors at once (not just the first).
///
/// These checks layer above the engine's allocation gate: a draft must pass
/// both before it is handed to the submission collaborator.
pub fn validate_draft(draft: &EvaluationDraft, limits: &Limits) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push("title: must not be empty".to_string());
    }

    if draft.course_id.is_none() {
        errors.push("course_id: a course must be selected".to_string());
    }

    if draft.questions.is_empty() {
        errors.push("questions: at least one question is required".to_string());
    }

    if draft.max_score < limits.min_max_score || draft.max_score > limits.max_max_score {
        errors.push(format!(
            "max_score: {} outside allowed range {}..{}",
            draft.max_score, limits.min_max_score, limits.max_max_score
        ));
    }

    if draft.time_limit_minutes < limits.min_time_limit
        || draft.time_limit_minutes > limits.max_time_limit
    {
        errors.push(format!(
            "time_limit_minutes: {} outside allowed range {}..{}",
            draft.time_limit_minutes, limits.min_time_limit, limits.max_time_limit
        ));
    }

    if draft.allow_retake && (draft.max_retakes < 1 || draft.max_retakes > limits.max_retakes) {
        errors.push(format!(
            "max_retakes: {} outside allowed range 1..{}",
            draft.max_retakes, limits.max_retakes
        ));
    }

    for (i, question) in draft.questions.iter().enumerate() {
        if question.statement.trim().is_empty() {
            errors.push(format!("questions[{}].statement: must not be empty", i));
        }

        if question.correct_answer.trim().is_empty() {
            errors.push(format!(
                "questions[{}].correct_answer: must not be empty",
                i
            ));
        }

        if question.points < 0 {
            errors.push(format!(
                "questions[{}].points: must be non-negative, got {}",
                i, question.points
            ));
        }

        if question.kind == QuestionKind::SingleChoice {
            if question.choices.len() < limits.min_choices {
                errors.push(format!(
                    "questions[{}].choices: at least {} choices required, got {}",
                    i,
                    limits.min_choices,
                    question.choices.len()
                ));
            }

            if !question.correct_answer.trim().is_empty()
                && !question.choices.contains(&question.correct_answer)
            {
                errors.push(format!(
                    "questions[{}].correct_answer: must match one of the choices",
                    i
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Question;

    fn valid_draft() -> EvaluationDraft {
        EvaluationDraft {
            title: "Quiz 1".to_string(),
            course_id: Some(7),
            questions: vec![Question {
                statement: "Pick A".to_string(),
                kind: QuestionKind::SingleChoice,
                choices: vec!["A".to_string(), "B".to_string()],
                correct_answer: "A".to_string(),
                points: 100,
                topic: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(validate_draft(&valid_draft(), &Limits::default()).is_ok());
    }

    #[test]
    fn test_empty_title() {
        let mut draft = valid_draft();
        draft.title = "   ".to_string();
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors[0].contains("title"));
    }

    #[test]
    fn test_missing_course() {
        let mut draft = valid_draft();
        draft.course_id = None;
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("course_id")));
    }

    #[test]
    fn test_no_questions() {
        let mut draft = valid_draft();
        draft.questions.clear();
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("at least one question")));
    }

    #[test]
    fn test_max_score_out_of_range() {
        let mut draft = valid_draft();
        draft.max_score = 501;
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("max_score")));

        draft.max_score = 0;
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("max_score")));
    }

    #[test]
    fn test_time_limit_out_of_range() {
        let mut draft = valid_draft();
        draft.time_limit_minutes = 481;
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("time_limit_minutes")));
    }

    #[test]
    fn test_retakes_checked_only_when_allowed() {
        let mut draft = valid_draft();
        draft.allow_retake = false;
        draft.max_retakes = 99;
        assert!(validate_draft(&draft, &Limits::default()).is_ok());

        draft.allow_retake = true;
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("max_retakes")));
    }

    #[test]
    fn test_blank_statement_and_answer() {
        let mut draft = valid_draft();
        draft.questions[0].statement = String::new();
        draft.questions[0].correct_answer = String::new();
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("questions[0].statement")));
        assert!(errors
            .iter()
            .any(|e| e.contains("questions[0].correct_answer")));
    }

    #[test]
    fn test_negative_points() {
        let mut draft = valid_draft();
        draft.questions[0].points = -5;
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("questions[0].points")));
    }

    #[test]
    fn test_single_choice_needs_two_choices() {
        let mut draft = valid_draft();
        draft.questions[0].choices = vec!["A".to_string()];
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("questions[0].choices")));
    }

    #[test]
    fn test_correct_answer_must_be_a_choice() {
        let mut draft = valid_draft();
        draft.questions[0].correct_answer = "C".to_string();
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.contains("must match one of the choices")));
    }

    #[test]
    fn test_open_kinds_skip_choice_rules() {
        let mut draft = valid_draft();
        draft.questions[0].kind = QuestionKind::ShortAnswer;
        draft.questions[0].choices.clear();
        draft.questions[0].correct_answer = "anything".to_string();
        assert!(validate_draft(&draft, &Limits::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let draft = EvaluationDraft {
            title: String::new(),      // error 1
            course_id: None,           // error 2
            questions: vec![],         // error 3
            max_score: 0,              // error 4
            time_limit_minutes: 0,     // error 5
            ..Default::default()
        };
        let errors = validate_draft(&draft, &Limits::default()).unwrap_err();
        assert_eq!(errors.len(), 5);
    }
}
