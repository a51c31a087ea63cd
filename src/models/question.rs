use std::fmt;

use serde::{Deserialize, Serialize};

/// A question as presented to the user, normalized from either backend shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    /// 1-based position within the assessment.
    pub position: u32,
    pub total: u32,
    pub choices: Vec<Choice>,
}

impl Question {
    /// Percentage of the assessment finished before this question.
    pub fn progress_percent(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        let done = self.position.saturating_sub(1).min(self.total);
        ((done as f64 / self.total as f64) * 100.0).round() as u16
    }

    pub fn choice(&self, index: usize) -> Option<&Choice> {
        self.choices.get(index)
    }
}

/// One selectable answer for a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub answer: Answer,
}

/// The value submitted to the backend for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// Free-text option, e.g. "Yes" / "No".
    Text(String),
    /// Likert scale value.
    Scale(i64),
}

impl Answer {
    pub fn is_affirmative(&self) -> bool {
        matches!(self, Answer::Text(text) if text.eq_ignore_ascii_case("yes"))
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Text(text) => f.write_str(text),
            Answer::Scale(value) => write!(f, "{value}"),
        }
    }
}
