use chrono::{DateTime, Utc};

use crate::api::ApiError;
use crate::models::{CompletedResult, QuizKind, Question};

use super::QuizProgress;

/// Where an attempt stands. Derived from the session's data, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Starting,
    AwaitingAnswer,
    Submitting,
    Completed,
    Errored,
}

/// The single way out of an errored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Clear the error and answer the same question again.
    Dismiss,
    /// The last answer was accepted; fetch the result again.
    RetryResult,
    /// The attempt never got a session; clear the error and go back to the
    /// start screen. Nothing else stored is touched.
    BackToStart,
}

/// Everything presentation needs to draw one quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub kind: QuizKind,
    pub phase: Phase,
    pub session_id: Option<String>,
    pub user_label: Option<String>,
    pub question: Option<Question>,
    pub result: Option<CompletedResult>,
    pub progress: Option<QuizProgress>,
    pub error: Option<ApiError>,
    pub recovery: Option<Recovery>,
    /// Informational message shown on the start screen, e.g. after expiry.
    pub notice: Option<String>,
}

impl SessionSnapshot {
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(ApiError::message)
    }

    pub fn answered(&self) -> u32 {
        self.progress.map(|p| p.answered).unwrap_or(0)
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        self.progress
            .map(|p| p.elapsed(now).num_seconds())
            .unwrap_or(0)
    }
}
