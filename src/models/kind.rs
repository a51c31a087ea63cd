use std::fmt;

use serde::{Deserialize, Serialize};

/// The two assessments offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizKind {
    /// Four-letter personality type from yes/no questions.
    Mbti,
    /// Six-axis Holland interest profile from Likert questions.
    Riasec,
}

impl QuizKind {
    pub const ALL: [QuizKind; 2] = [QuizKind::Mbti, QuizKind::Riasec];

    /// Path segment used by the backend routes.
    pub fn slug(self) -> &'static str {
        match self {
            QuizKind::Mbti => "mbti",
            QuizKind::Riasec => "riasec",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            QuizKind::Mbti => "MBTI",
            QuizKind::Riasec => "RIASEC",
        }
    }

    /// Whether the user supplies their own label when starting.
    pub fn requires_user_label(self) -> bool {
        matches!(self, QuizKind::Mbti)
    }

    /// Label sent to the backend when the user is not asked for one.
    pub fn placeholder_label(self) -> &'static str {
        "User"
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
