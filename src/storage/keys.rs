//! Storage key namespace. One file per key in a [`FileStore`](super::FileStore).

use crate::models::QuizKind;

/// `{sessionID, currentQuestion, result, userLabel?}` for one quiz type.
pub fn session_key(kind: QuizKind) -> &'static str {
    match kind {
        QuizKind::Mbti => "mbti_quiz_state",
        QuizKind::Riasec => "riasec_quiz_state",
    }
}

/// Last completed result, read by the dashboard and the recommender flow.
pub fn result_key(kind: QuizKind) -> &'static str {
    match kind {
        QuizKind::Mbti => "mbti_result",
        QuizKind::Riasec => "riasec_result",
    }
}

/// Start-time marker and answered counter; display only.
pub fn progress_key(kind: QuizKind) -> &'static str {
    match kind {
        QuizKind::Mbti => "mbti_progress",
        QuizKind::Riasec => "riasec_progress",
    }
}
