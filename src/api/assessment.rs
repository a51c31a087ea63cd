//! Client for the session-based assessment endpoints.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::{Answer, CompletedResult, MbtiResult, QuizKind, RiasecResult};
use crate::protocol::{CaptureBody, StartedSession, SubmitOutcome, classify_submit_response, parse_start};

use super::body::failure_message;
use super::error::indicates_expired_session;
use super::{ApiError, endpoint};

/// Remote operations for one quiz type.
#[async_trait]
pub trait AssessmentBackend: Send + Sync {
    fn kind(&self) -> QuizKind;

    /// Create a session and return its first question.
    async fn start(&self, user_label: &str) -> Result<StartedSession, ApiError>;

    /// Record an answer and learn what comes next.
    async fn submit_answer(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &Answer,
    ) -> Result<SubmitOutcome, ApiError>;

    async fn fetch_result(&self, session_id: &str) -> Result<CompletedResult, ApiError>;

    /// Tell the backend to drop a session we no longer need.
    async fn end_session(&self, session_id: &str) -> Result<(), ApiError>;
}

/// `AssessmentBackend` over the backend's `/api/v1/{mbti|riasec}` routes.
#[derive(Clone)]
pub struct HttpAssessmentClient {
    http: Client,
    base: Url,
    kind: QuizKind,
}

impl HttpAssessmentClient {
    pub fn new(http: Client, base: Url, kind: QuizKind) -> Self {
        Self { http, base, kind }
    }

    fn url(&self, action: &str, id: &str) -> Url {
        endpoint(&self.base, &["api", "v1", self.kind.slug(), action, id])
    }

    fn failed(&self, action: &str) -> String {
        format!("{} {action} failed", self.kind)
    }

    /// Map a non-2xx status to either an expiry or the operation's own error.
    async fn classify_failure(
        &self,
        response: reqwest::Response,
        action: &str,
        otherwise: fn(String) -> ApiError,
    ) -> ApiError {
        let status = response.status();
        let message = failure_message(response, &self.failed(action)).await;
        warn!(kind = %self.kind, %status, %message, "{action} rejected by backend");

        if indicates_expired_session(Some(status.as_u16()), &message) {
            ApiError::expired(&message)
        } else {
            otherwise(message)
        }
    }
}

#[async_trait]
impl AssessmentBackend for HttpAssessmentClient {
    fn kind(&self) -> QuizKind {
        self.kind
    }

    async fn start(&self, user_label: &str) -> Result<StartedSession, ApiError> {
        let url = self.url("sessionStart", user_label);
        debug!(kind = %self.kind, %url, "starting session");

        let response = self.http.post(url).send().await.map_err(|e| {
            ApiError::StartFailed(format!(
                "{}: could not reach the backend ({}). Please check that it is running.",
                self.failed("start"),
                e.without_url()
            ))
        })?;

        if !response.status().is_success() {
            let message = failure_message(response, &self.failed("start")).await;
            warn!(kind = %self.kind, %message, "session start rejected");
            return Err(ApiError::StartFailed(message));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::StartFailed(format!("{}: {}", self.failed("start"), e.without_url())))?;
        let started = parse_start(self.kind, &body).map_err(ApiError::StartFailed)?;

        info!(kind = %self.kind, session_id = %started.session_id, "session started");
        Ok(started)
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &Answer,
    ) -> Result<SubmitOutcome, ApiError> {
        let payload =
            CaptureBody::new(self.kind, question_id, answer).map_err(ApiError::SubmitFailed)?;
        let url = self.url("captureRes", session_id);
        debug!(kind = %self.kind, %session_id, %question_id, %answer, "capturing answer");

        let response = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                ApiError::SubmitFailed(format!("{}: {}", self.failed("capture"), e.without_url()))
            })?;

        if !response.status().is_success() {
            return Err(self
                .classify_failure(response, "capture", ApiError::SubmitFailed)
                .await);
        }

        let body: Value = response.json().await.map_err(|e| {
            ApiError::MalformedResponse(format!("{}: {}", self.failed("capture"), e.without_url()))
        })?;
        Ok(classify_submit_response(self.kind, &body))
    }

    async fn fetch_result(&self, session_id: &str) -> Result<CompletedResult, ApiError> {
        let url = self.url("result", session_id);
        debug!(kind = %self.kind, %session_id, "fetching result");

        let response = self.http.post(url).send().await.map_err(|e| {
            ApiError::ResultFetchFailed(format!("{}: {}", self.failed("result"), e.without_url()))
        })?;

        if !response.status().is_success() {
            return Err(self
                .classify_failure(response, "result", ApiError::ResultFetchFailed)
                .await);
        }

        let unreadable =
            |e: String| ApiError::ResultFetchFailed(format!("{}: {e}", self.failed("result")));
        let body: Value = response
            .json()
            .await
            .map_err(|e| unreadable(e.without_url().to_string()))?;

        let result = match self.kind {
            QuizKind::Mbti => serde_json::from_value::<MbtiResult>(body)
                .map(CompletedResult::Mbti)
                .map_err(|e| unreadable(e.to_string()))?,
            QuizKind::Riasec => serde_json::from_value::<RiasecResult>(body)
                .map(CompletedResult::Riasec)
                .map_err(|e| unreadable(e.to_string()))?,
        };

        info!(kind = %self.kind, %session_id, "result received");
        Ok(result)
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ApiError> {
        let url = self.url("endSession", session_id);
        let response = self.http.post(url).send().await.map_err(|e| {
            ApiError::EndSessionFailed(format!("{}: {}", self.failed("end session"), e.without_url()))
        })?;

        if !response.status().is_success() {
            let message = failure_message(response, &self.failed("end session")).await;
            return Err(ApiError::EndSessionFailed(message));
        }

        debug!(kind = %self.kind, %session_id, "session ended");
        Ok(())
    }
}
