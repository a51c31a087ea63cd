use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::QuizKind;
use crate::storage::{KeyValueStore, load_json, progress_key, remove_key, save_json};

/// When the current attempt started and how many answers were sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizProgress {
    pub started_at: DateTime<Utc>,
    pub answered: u32,
}

impl QuizProgress {
    pub fn begin(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            answered: 0,
        }
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    pub fn load(store: &dyn KeyValueStore, kind: QuizKind) -> Option<Self> {
        load_json(store, progress_key(kind))
    }

    pub fn save(&self, store: &dyn KeyValueStore, kind: QuizKind) {
        save_json(store, progress_key(kind), self);
    }

    pub fn clear(store: &dyn KeyValueStore, kind: QuizKind) {
        remove_key(store, progress_key(kind));
    }
}
