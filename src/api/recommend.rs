//! Client for the career-cluster recommender.

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::models::{ClusterRecommendation, RiasecScores};
use crate::protocol::RecommendRequest;

use super::body::failure_message;
use super::{ApiError, endpoint};

const FAILURE_PREFIX: &str = "Cluster recommend failed";

#[async_trait]
pub trait RecommendationBackend: Send + Sync {
    /// Rank career clusters for a personality type and raw interest scores.
    async fn recommend(
        &self,
        personality_type: &str,
        raw_interest_scores: &RiasecScores,
    ) -> Result<Vec<ClusterRecommendation>, ApiError>;
}

#[derive(Clone)]
pub struct HttpRecommendationClient {
    http: Client,
    base: Url,
}

impl HttpRecommendationClient {
    pub fn new(http: Client, base: Url) -> Self {
        Self { http, base }
    }

    fn url(&self) -> Url {
        endpoint(&self.base, &["api", "v1", "cluster", "recommend"])
    }
}

/// Every recommender failure reads "Cluster recommend failed: ..." exactly once.
fn recommendation_failed(message: impl Into<String>) -> ApiError {
    let message = message.into();
    if message.contains(FAILURE_PREFIX) {
        ApiError::RecommendationFailed(message)
    } else {
        ApiError::RecommendationFailed(format!("{FAILURE_PREFIX}: {message}"))
    }
}

#[async_trait]
impl RecommendationBackend for HttpRecommendationClient {
    async fn recommend(
        &self,
        personality_type: &str,
        raw_interest_scores: &RiasecScores,
    ) -> Result<Vec<ClusterRecommendation>, ApiError> {
        let request = RecommendRequest {
            mbti: personality_type,
            riasec_raw: raw_interest_scores,
        };
        debug!(%personality_type, "requesting cluster recommendations");

        let response = self
            .http
            .post(self.url())
            .json(&request)
            .send()
            .await
            .map_err(|e| recommendation_failed(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let fallback = format!("{FAILURE_PREFIX}: {}", status.as_u16());
            let message = failure_message(response, &fallback).await;
            warn!(%status, %message, "recommendation rejected");
            return Err(recommendation_failed(message));
        }

        let clusters: Vec<ClusterRecommendation> = response
            .json()
            .await
            .map_err(|e| recommendation_failed(e.without_url().to_string()))?;
        debug!(count = clusters.len(), "recommendations received");
        Ok(clusters)
    }
}
