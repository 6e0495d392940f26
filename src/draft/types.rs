use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of a scored question.
///
/// Closed kinds (`SingleChoice`, `TrueFalse`) can be graded by exact
/// comparison; open kinds need a human (or an external analysis service).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    TrueFalse,
    ShortAnswer,
    LongAnswer,
}

impl QuestionKind {
    /// Whether answers of this kind can be auto-graded by exact comparison.
    pub fn is_closed(&self) -> bool {
        matches!(self, QuestionKind::SingleChoice | QuestionKind::TrueFalse)
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleChoice => write!(f, "single_choice"),
            QuestionKind::TrueFalse => write!(f, "true_false"),
            QuestionKind::ShortAnswer => write!(f, "short_answer"),
            QuestionKind::LongAnswer => write!(f, "long_answer"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single_choice" | "choice" => Ok(QuestionKind::SingleChoice),
            "true_false" | "tf" => Ok(QuestionKind::TrueFalse),
            "short_answer" | "short" => Ok(QuestionKind::ShortAnswer),
            "long_answer" | "long" => Ok(QuestionKind::LongAnswer),
            other => Err(format!("unknown question kind: {}", other)),
        }
    }
}

/// One scored item within an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to students.
    #[serde(default)]
    pub statement: String,
    pub kind: QuestionKind,
    /// Answer options; populated for `single_choice`, empty otherwise.
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    /// Point value. Missing in a draft file reads as 0.
    #[serde(default)]
    pub points: i64,
    /// Optional topic tag used for weak/strong area reporting.
    #[serde(default)]
    pub topic: Option<String>,
}

impl Question {
    /// A freshly added question: zero points, single choice, four empty
    /// options, nothing filled in yet.
    pub fn blank() -> Self {
        Self {
            statement: String::new(),
            kind: QuestionKind::SingleChoice,
            choices: vec![String::new(); 4],
            correct_answer: String::new(),
            points: 0,
            topic: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    Exam,
    Quiz,
    Midterm,
    Final,
    Practice,
}

impl fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationKind::Exam => write!(f, "exam"),
            EvaluationKind::Quiz => write!(f, "quiz"),
            EvaluationKind::Midterm => write!(f, "midterm"),
            EvaluationKind::Final => write!(f, "final"),
            EvaluationKind::Practice => write!(f, "practice"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Draft,
    Published,
}

/// An evaluation being authored. In-memory only until handed to the
/// submission collaborator; `draft::storage` persists it as JSON between
/// editing sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDraft {
    /// Draft file format version.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub course_id: Option<u64>,
    #[serde(default = "default_kind")]
    pub kind: EvaluationKind,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Minutes students get to complete the evaluation.
    #[serde(default = "default_time_limit")]
    pub time_limit_minutes: u32,
    /// Ceiling for the sum of question points. Independent of the questions;
    /// never derived from them.
    #[serde(default = "default_max_score")]
    pub max_score: i64,
    #[serde(default = "default_true")]
    pub auto_grade: bool,
    #[serde(default = "default_true")]
    pub show_answers: bool,
    #[serde(default)]
    pub allow_retake: bool,
    #[serde(default = "default_max_retakes")]
    pub max_retakes: u32,
    #[serde(default = "default_status")]
    pub status: EvaluationStatus,
    #[serde(default)]
    pub questions: Vec<Question>,
}

fn default_version() -> u32 {
    1
}

fn default_kind() -> EvaluationKind {
    EvaluationKind::Exam
}

fn default_time_limit() -> u32 {
    60
}

fn default_max_score() -> i64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_max_retakes() -> u32 {
    1
}

fn default_status() -> EvaluationStatus {
    EvaluationStatus::Draft
}

impl Default for EvaluationDraft {
    fn default() -> Self {
        Self {
            version: default_version(),
            title: String::new(),
            description: String::new(),
            course_id: None,
            kind: default_kind(),
            due_date: None,
            time_limit_minutes: default_time_limit(),
            max_score: default_max_score(),
            auto_grade: true,
            show_answers: true,
            allow_retake: false,
            max_retakes: default_max_retakes(),
            status: default_status(),
            questions: Vec::new(),
        }
    }
}

/// What gets handed to the submission collaborator once the allocation gate
/// passes: the final question list and the resolved total score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub questions: Vec<Question>,
    pub total_score: i64,
}
