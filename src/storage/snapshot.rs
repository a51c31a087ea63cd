use serde::{Deserialize, Serialize};

use crate::models::{CompletedResult, QuizKind, Question};

use super::keys::session_key;
use super::store::{KeyValueStore, load_json, remove_key, save_json};

/// The durable part of a quiz session, written after every transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub current_question: Option<Question>,
    #[serde(default)]
    pub result: Option<CompletedResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
}

impl PersistedSession {
    /// Restore the snapshot for `kind`, or an empty one if absent or corrupt.
    ///
    /// A stored result wins over a stored question, and a result of the wrong
    /// quiz type is ignored. A question without a session id is discarded, as
    /// is a session id with neither a question nor a result.
    pub fn load(store: &dyn KeyValueStore, kind: QuizKind) -> Self {
        let mut snapshot: Self = load_json(store, session_key(kind)).unwrap_or_default();

        if snapshot
            .result
            .as_ref()
            .is_some_and(|result| result.kind() != kind)
        {
            snapshot.result = None;
        }
        if snapshot.result.is_some() || snapshot.session_id.is_none() {
            snapshot.current_question = None;
        }
        if snapshot.result.is_none() && snapshot.current_question.is_none() {
            snapshot.session_id = None;
        }
        snapshot
    }

    pub fn save(&self, store: &dyn KeyValueStore, kind: QuizKind) {
        save_json(store, session_key(kind), self);
    }

    pub fn clear(store: &dyn KeyValueStore, kind: QuizKind) {
        remove_key(store, session_key(kind));
    }
}
