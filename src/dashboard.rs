//! Dashboard model: both cached results plus the career-cluster
//! recommendation derived from them.

use tracing::{debug, warn};

use crate::api::{ApiError, RecommendationBackend};
use crate::models::{ClusterRecommendation, MbtiResult, RiasecAxis, RiasecResult, RiasecScores};
use crate::storage::ResultCache;

const SHOWN_CLUSTERS: usize = 3;

/// Where the recommendation fetch stands. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Recommendations {
    #[default]
    Idle,
    Loading,
    Ready(Vec<ClusterRecommendation>),
    Failed(String),
}

/// Everything needed to ask the recommender, tagged with the request it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub id: u64,
    pub personality_type: String,
    pub raw_scores: RiasecScores,
}

impl RecommendationRequest {
    pub async fn send(
        self,
        backend: &dyn RecommendationBackend,
    ) -> (u64, Result<Vec<ClusterRecommendation>, ApiError>) {
        let result = backend
            .recommend(&self.personality_type, &self.raw_scores)
            .await;
        (self.id, result)
    }
}

pub struct Dashboard {
    cache: ResultCache,
    mbti: Option<MbtiResult>,
    riasec: Option<RiasecResult>,
    recommendations: Recommendations,
    /// Identifies the request whose answer is still wanted.
    request_id: u64,
}

impl Dashboard {
    pub fn new(cache: ResultCache) -> Self {
        Self {
            cache,
            mbti: None,
            riasec: None,
            recommendations: Recommendations::Idle,
            request_id: 0,
        }
    }

    /// Re-read both result slots and forget any previous recommendation.
    pub fn refresh(&mut self) {
        self.mbti = self.cache.mbti();
        self.riasec = self.cache.riasec();
        self.request_id += 1;
        self.recommendations = Recommendations::Idle;
        debug!(
            mbti = self.mbti.is_some(),
            riasec = self.riasec.is_some(),
            "dashboard refreshed"
        );
    }

    pub fn mbti(&self) -> Option<&MbtiResult> {
        self.mbti.as_ref()
    }

    pub fn riasec(&self) -> Option<&RiasecResult> {
        self.riasec.as_ref()
    }

    pub fn recommendations(&self) -> &Recommendations {
        &self.recommendations
    }

    pub fn can_recommend(&self) -> bool {
        self.mbti.is_some() && self.riasec.is_some()
    }

    pub fn top_interests(&self) -> Vec<RiasecAxis> {
        self.riasec
            .as_ref()
            .map(RiasecResult::top_axes)
            .unwrap_or_default()
    }

    /// The highest-ranked clusters, best first.
    pub fn top_clusters(&self) -> &[ClusterRecommendation] {
        match &self.recommendations {
            Recommendations::Ready(clusters) => &clusters[..clusters.len().min(SHOWN_CLUSTERS)],
            _ => &[],
        }
    }

    /// Mark a recommendation as loading and describe the call to make, if
    /// both profiles are present.
    pub fn begin_request(&mut self) -> Option<RecommendationRequest> {
        let (mbti, riasec) = (self.mbti.as_ref()?, self.riasec.as_ref()?);
        self.request_id += 1;
        self.recommendations = Recommendations::Loading;
        Some(RecommendationRequest {
            id: self.request_id,
            personality_type: mbti.mbti.clone(),
            raw_scores: riasec.raw_scores.clone(),
        })
    }

    /// Apply a finished request. Answers to superseded requests are dropped.
    pub fn apply(&mut self, id: u64, result: Result<Vec<ClusterRecommendation>, ApiError>) {
        if id != self.request_id || self.recommendations != Recommendations::Loading {
            debug!(id, current = self.request_id, "discarding stale recommendation");
            return;
        }
        self.recommendations = match result {
            Ok(clusters) => Recommendations::Ready(clusters),
            Err(e) => {
                warn!(error = %e, "recommendation failed");
                Recommendations::Failed(e.message().to_string())
            }
        };
    }

    /// Navigating away discards the recommendation and anything still in flight.
    pub fn leave(&mut self) {
        self.request_id += 1;
        self.recommendations = Recommendations::Idle;
    }
}
