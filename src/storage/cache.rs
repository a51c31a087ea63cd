use std::sync::Arc;

use tracing::debug;

use crate::models::{CompletedResult, MbtiResult, QuizKind, RiasecResult};

use super::keys::result_key;
use super::store::{KeyValueStore, load_json, save_json};

/// The most recent completed result of each quiz type.
///
/// Values are written once when a quiz completes and only ever replaced
/// wholesale or cleared by a restart.
#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn KeyValueStore>,
}

impl ResultCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, kind: QuizKind) -> Option<CompletedResult> {
        let result: CompletedResult = load_json(self.store.as_ref(), result_key(kind))?;
        (result.kind() == kind).then_some(result)
    }

    pub fn mbti(&self) -> Option<MbtiResult> {
        self.load(QuizKind::Mbti)?.into_mbti()
    }

    pub fn riasec(&self) -> Option<RiasecResult> {
        self.load(QuizKind::Riasec)?.into_riasec()
    }

    pub fn store(&self, result: &CompletedResult) {
        debug!(kind = %result.kind(), "caching completed result");
        save_json(self.store.as_ref(), result_key(result.kind()), result);
    }
}
