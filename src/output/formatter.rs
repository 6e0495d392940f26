use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::draft::{EvaluationDraft, QuestionKind};
use crate::grading::AttemptReport;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Short column code for a question kind
pub fn kind_code(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::SingleChoice => "choice",
        QuestionKind::TrueFalse => "tf",
        QuestionKind::ShortAnswer => "short",
        QuestionKind::LongAnswer => "long",
    }
}

/// Truncate a statement to fit available width, accounting for Unicode
fn truncate_statement(statement: &str, max_width: usize) -> String {
    let chars: Vec<char> = statement.chars().collect();
    if chars.len() <= max_width {
        statement.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Allocated points as a display percentage, clamped to 0..100
///
/// The raw utilization can exceed 100 when over-allocated; display never
/// does.
pub fn format_utilization(percent: f64) -> String {
    format!("{:.0}%", percent.clamp(0.0, 100.0))
}

/// Format the draft's questions as an allocation table with a totals footer
/// Columns: Index, Points, Kind, Statement (truncated to terminal width)
/// Index column: 3 chars, right-aligned; Points column: 5 chars, right-aligned
pub fn format_allocation_table(draft: &EvaluationDraft, use_colors: bool) -> String {
    if draft.questions.is_empty() {
        return "No questions yet.".to_string();
    }

    let term_width = get_terminal_width();

    let index_width = 3;
    let points_width = 5;
    let kind_width = 6;
    let separator = "  ";
    let fixed_width = index_width + 1 + points_width + kind_width + separator.len() * 3;

    let mut lines: Vec<String> = draft
        .questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let index_str = format!("{:>2}.", idx + 1);
            let points_str = format!("{:>width$}", question.points, width = points_width);
            let kind_str = format!("{:<width$}", kind_code(question.kind), width = kind_width);

            let raw_statement = if question.statement.is_empty() {
                "(blank)"
            } else {
                question.statement.as_str()
            };
            let statement = if let Some(width) = term_width {
                if width > fixed_width + 10 {
                    truncate_statement(raw_statement, width - fixed_width)
                } else {
                    truncate_statement(raw_statement, 20)
                }
            } else {
                // No terminal (pipe), don't truncate
                raw_statement.to_string()
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    index_str.dimmed(),
                    points_str.bold(),
                    separator,
                    kind_str.cyan(),
                    separator,
                    statement
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    index_str, points_str, separator, kind_str, separator, statement
                )
            }
        })
        .collect();

    let total: i64 = draft.questions.iter().map(|q| q.points).sum();
    let percent = if draft.max_score > 0 {
        total as f64 / draft.max_score as f64 * 100.0
    } else {
        0.0
    };

    let mut footer = format!(
        "Total: {}/{} pts ({} allocated)",
        total,
        draft.max_score,
        format_utilization(percent)
    );
    if total > draft.max_score {
        footer.push_str(&format!(", over by {}", total - draft.max_score));
        if use_colors {
            footer = footer.red().bold().to_string();
        }
    }

    lines.push(String::new());
    lines.push(footer);
    lines.join("\n")
}

/// Format validation errors as a bulleted list
pub fn format_validation_errors(errors: &[String], use_colors: bool) -> String {
    errors
        .iter()
        .map(|error| {
            if use_colors {
                format!("  - {}", error.red())
            } else {
                format!("  - {}", error)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the over-allocation message with both totals and the two
/// corrective commands
pub fn format_exceeds_hint(total_points: i64, max_score: i64, use_colors: bool) -> String {
    let headline = format!(
        "Allocated points {} exceed the maximum score {}.",
        total_points, max_score
    );
    let hint = "Fix with 'allot normalize' (proportional) or 'allot spread' (even split), or edit points by hand.";

    if use_colors {
        format!("{}\n{}", headline.red().bold(), hint.dimmed())
    } else {
        format!("{}\n{}", headline, hint)
    }
}

/// Format an attempt report with detailed multi-line output
pub fn format_attempt_report(report: &AttemptReport, use_colors: bool) -> String {
    let score_line = format!(
        "Score: {}/{} pts ({:.2}%)",
        report.points_earned, report.points_possible, report.percent_correct
    );

    let mut lines = vec![
        if use_colors {
            score_line.bold().to_string()
        } else {
            score_line
        },
        format!(
            "  Correct: {}/{} answered",
            report.correct_count,
            report.answers.len()
        ),
        format!("  Confidence: {:.2}", report.confidence),
        format!("  Difficulty: {}", report.difficulty),
        format!("  Review priority: {}", report.priority),
    ];

    if report.needs_review {
        let note = "  Has open answers awaiting manual review";
        lines.push(if use_colors {
            note.yellow().to_string()
        } else {
            note.to_string()
        });
    }

    if !report.weak_areas.is_empty() {
        lines.push(format!("  Weak areas: {}", report.weak_areas.join(", ")));
    }
    if !report.strong_areas.is_empty() {
        lines.push(format!(
            "  Strong areas: {}",
            report.strong_areas.join(", ")
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Question;
    use crate::grading::{grade_attempt, AttemptAnswer};

    fn sample_draft() -> EvaluationDraft {
        EvaluationDraft {
            title: "Quiz".to_string(),
            max_score: 100,
            questions: vec![
                Question {
                    statement: "What is ownership?".to_string(),
                    kind: QuestionKind::ShortAnswer,
                    choices: vec![],
                    correct_answer: "moves".to_string(),
                    points: 40,
                    topic: None,
                },
                Question {
                    statement: String::new(),
                    kind: QuestionKind::TrueFalse,
                    choices: vec![],
                    correct_answer: "true".to_string(),
                    points: 60,
                    topic: None,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(kind_code(QuestionKind::SingleChoice), "choice");
        assert_eq!(kind_code(QuestionKind::TrueFalse), "tf");
        assert_eq!(kind_code(QuestionKind::ShortAnswer), "short");
        assert_eq!(kind_code(QuestionKind::LongAnswer), "long");
    }

    #[test]
    fn test_truncate_statement_short() {
        assert_eq!(truncate_statement("Short", 20), "Short");
    }

    #[test]
    fn test_truncate_statement_long() {
        assert_eq!(
            truncate_statement("This is a very long statement", 15),
            "This is a ve..."
        );
    }

    #[test]
    fn test_truncate_statement_unicode() {
        // Truncation counts chars, not bytes
        assert_eq!(truncate_statement("¿Qué es la memoria?", 10), "¿Qué es...");
    }

    #[test]
    fn test_format_utilization_clamps() {
        assert_eq!(format_utilization(120.0), "100%");
        assert_eq!(format_utilization(50.0), "50%");
        assert_eq!(format_utilization(-5.0), "0%");
    }

    #[test]
    fn test_table_empty() {
        let draft = EvaluationDraft::default();
        assert_eq!(format_allocation_table(&draft, false), "No questions yet.");
    }

    #[test]
    fn test_table_rows_and_footer() {
        let result = format_allocation_table(&sample_draft(), false);
        assert!(result.contains(" 1."));
        assert!(result.contains(" 2."));
        assert!(result.contains("short"));
        assert!(result.contains("tf"));
        assert!(result.contains("What is ownership?"));
        assert!(result.contains("(blank)"));
        assert!(result.contains("Total: 100/100 pts (100% allocated)"));
    }

    #[test]
    fn test_table_footer_when_over_allocated() {
        let mut draft = sample_draft();
        draft.max_score = 80;
        let result = format_allocation_table(&draft, false);
        // Displayed percentage stays clamped even though raw is 125%
        assert!(result.contains("Total: 100/80 pts (100% allocated), over by 20"));
    }

    #[test]
    fn test_validation_errors_list() {
        let errors = vec!["title: must not be empty".to_string(), "x: bad".to_string()];
        let result = format_validation_errors(&errors, false);
        assert_eq!(result, "  - title: must not be empty\n  - x: bad");
    }

    #[test]
    fn test_exceeds_hint_has_both_numbers_and_both_commands() {
        let result = format_exceeds_hint(120, 100, false);
        assert!(result.contains("120"));
        assert!(result.contains("100"));
        assert!(result.contains("normalize"));
        assert!(result.contains("spread"));
    }

    #[test]
    fn test_attempt_report_format() {
        let draft = sample_draft();
        let report = grade_attempt(
            &draft,
            &[
                AttemptAnswer {
                    question_index: 0,
                    response: "moves".to_string(),
                },
                AttemptAnswer {
                    question_index: 1,
                    response: "true".to_string(),
                },
            ],
        );
        let result = format_attempt_report(&report, false);
        assert!(result.contains("Score: 60/100 pts"));
        assert!(result.contains("Correct: 1/2 answered"));
        assert!(result.contains("Review priority: urgent"));
        assert!(result.contains("awaiting manual review"));
    }
}
