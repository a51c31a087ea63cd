//! The quiz session state machine.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::api::{ApiError, AssessmentBackend};
use crate::models::{Answer, CompletedResult, QuizKind, Question};
use crate::protocol::SubmitOutcome;
use crate::storage::{KeyValueStore, PersistedSession, ResultCache, remove_key, result_key};

use super::view::{Phase, Recovery, SessionSnapshot};
use super::QuizProgress;

/// Why an operation was refused without touching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("a request is already in flight")]
    Busy,
    #[error("Enter your name")]
    LabelRequired,
    #[error("an assessment is already in progress")]
    AlreadyStarted,
    #[error("there is no question awaiting an answer")]
    NoPendingQuestion,
    #[error("there is no error to recover from")]
    NothingToRecover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InFlight {
    Starting,
    Submitting,
    FetchingResult,
}

/// Identifies the session a network call was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ticket {
    epoch: u64,
    session_id: Option<String>,
}

/// How a submission (or result retry) ended, before it is applied.
enum Resolution {
    Next(Question),
    Finished(CompletedResult),
    ResultFailed(ApiError),
    Failed(ApiError),
}

impl Resolution {
    fn from_result(result: Result<CompletedResult, ApiError>) -> Self {
        match result {
            Ok(result) => Resolution::Finished(result),
            Err(e) => Resolution::ResultFailed(e),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    session_id: Option<String>,
    user_label: Option<String>,
    question: Option<Question>,
    result: Option<CompletedResult>,
    progress: Option<QuizProgress>,
    in_flight: Option<InFlight>,
    failure: Option<ApiError>,
    notice: Option<String>,
    /// The final answer was accepted but fetching the result failed.
    result_pending: bool,
    /// Bumped whenever the session is torn down; stale responses carry an old epoch.
    epoch: u64,
}

impl SessionState {
    fn restored(persisted: PersistedSession, progress: Option<QuizProgress>, epoch: u64) -> Self {
        Self {
            session_id: persisted.session_id,
            user_label: persisted.user_label,
            question: persisted.current_question,
            result: persisted.result,
            progress,
            epoch,
            ..Self::default()
        }
    }

    fn phase(&self) -> Phase {
        match self.in_flight {
            Some(InFlight::Starting) => Phase::Starting,
            Some(InFlight::Submitting | InFlight::FetchingResult) => Phase::Submitting,
            None if self.failure.is_some() => Phase::Errored,
            None if self.result.is_some() => Phase::Completed,
            None if self.question.is_some() => Phase::AwaitingAnswer,
            None => Phase::NotStarted,
        }
    }

    fn recovery(&self) -> Option<Recovery> {
        if self.phase() != Phase::Errored {
            return None;
        }
        if self.result_pending {
            Some(Recovery::RetryResult)
        } else if self.question.is_some() {
            Some(Recovery::Dismiss)
        } else {
            Some(Recovery::BackToStart)
        }
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            epoch: self.epoch,
            session_id: self.session_id.clone(),
        }
    }

    fn matches(&self, ticket: &Ticket) -> bool {
        self.epoch == ticket.epoch && self.session_id == ticket.session_id
    }

    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            session_id: self.session_id.clone(),
            current_question: self.question.clone(),
            result: self.result.clone(),
            user_label: self.user_label.clone(),
        }
    }

    fn snapshot(&self, kind: QuizKind) -> SessionSnapshot {
        SessionSnapshot {
            kind,
            phase: self.phase(),
            session_id: self.session_id.clone(),
            user_label: self.user_label.clone(),
            question: self.question.clone(),
            result: self.result.clone(),
            progress: self.progress,
            error: self.failure.clone(),
            recovery: self.recovery(),
            notice: self.notice.clone(),
        }
    }
}

/// Controller for one quiz type.
///
/// All operations take `&self`; the session is meant to be shared behind an
/// `Arc` so network calls can run in spawned tasks while the UI keeps
/// rendering. The state lock is never held across a network call.
pub struct QuizSession {
    kind: QuizKind,
    backend: Arc<dyn AssessmentBackend>,
    store: Arc<dyn KeyValueStore>,
    cache: ResultCache,
    state: Mutex<SessionState>,
    updates: watch::Sender<SessionSnapshot>,
}

impl QuizSession {
    /// Build a session for `backend`'s quiz type, resuming whatever was persisted.
    pub fn restore(backend: Arc<dyn AssessmentBackend>, store: Arc<dyn KeyValueStore>) -> Self {
        let kind = backend.kind();
        let state = SessionState::restored(
            PersistedSession::load(store.as_ref(), kind),
            QuizProgress::load(store.as_ref(), kind),
            0,
        );
        debug!(%kind, phase = ?state.phase(), "session restored");

        let (updates, _) = watch::channel(state.snapshot(kind));
        Self {
            kind,
            backend,
            cache: ResultCache::new(Arc::clone(&store)),
            store,
            state: Mutex::new(state),
            updates,
        }
    }

    pub fn kind(&self) -> QuizKind {
        self.kind
    }

    pub fn backend(&self) -> Arc<dyn AssessmentBackend> {
        Arc::clone(&self.backend)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.updates.borrow().clone()
    }

    /// Receive a new snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Persist, then publish. Readers never observe a state that is not yet on disk.
    fn commit(&self, state: &SessionState) {
        state.persisted().save(self.store.as_ref(), self.kind);
        if let Some(progress) = &state.progress {
            progress.save(self.store.as_ref(), self.kind);
        }
        self.publish(state);
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.snapshot(self.kind));
    }

    /// Create a backend session and move to the first question.
    pub async fn start(&self, user_label: &str) -> Result<Phase, Rejection> {
        let label = user_label.trim();
        let (ticket, sent_label) = {
            let mut state = self.state.lock().await;
            if state.in_flight.is_some() {
                return Err(Rejection::Busy);
            }
            if state.session_id.is_some() || state.result.is_some() {
                return Err(Rejection::AlreadyStarted);
            }
            if self.kind.requires_user_label() && label.is_empty() {
                return Err(Rejection::LabelRequired);
            }

            state.in_flight = Some(InFlight::Starting);
            state.failure = None;
            state.notice = None;
            state.result_pending = false;
            state.user_label = self.kind.requires_user_label().then(|| label.to_string());
            state.progress = Some(QuizProgress::begin(Utc::now()));
            self.commit(&state);

            let sent_label = state
                .user_label
                .clone()
                .unwrap_or_else(|| self.kind.placeholder_label().to_string());
            (state.ticket(), sent_label)
        };

        info!(kind = %self.kind, "starting assessment");
        let outcome = self.backend.start(&sent_label).await;

        let mut state = self.state.lock().await;
        if !state.matches(&ticket) {
            debug!(kind = %self.kind, "discarding start response for a superseded attempt");
            return Ok(state.phase());
        }

        state.in_flight = None;
        match outcome {
            Ok(started) => {
                state.session_id = Some(started.session_id);
                state.question = Some(started.question);
            }
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "failed to start assessment");
                state.failure = Some(e);
            }
        }
        self.commit(&state);
        Ok(state.phase())
    }

    /// Answer the current question.
    ///
    /// Only one submission may be in flight; overlapping calls are refused
    /// with [`Rejection::Busy`] and never reach the backend.
    pub async fn submit(&self, answer: Answer) -> Result<Phase, Rejection> {
        let (ticket, session_id, question_id) = {
            let mut state = self.state.lock().await;
            if state.in_flight.is_some() {
                debug!(kind = %self.kind, "ignoring overlapping submission");
                return Err(Rejection::Busy);
            }
            if state.phase() != Phase::AwaitingAnswer {
                return Err(Rejection::NoPendingQuestion);
            }
            let (Some(session_id), Some(question)) = (&state.session_id, &state.question) else {
                return Err(Rejection::NoPendingQuestion);
            };
            let (session_id, question_id) = (session_id.clone(), question.id.clone());

            state.in_flight = Some(InFlight::Submitting);
            state.notice = None;
            state
                .progress
                .get_or_insert_with(|| QuizProgress::begin(Utc::now()))
                .answered += 1;
            self.commit(&state);
            (state.ticket(), session_id, question_id)
        };

        debug!(kind = %self.kind, %question_id, %answer, "submitting answer");
        let resolution = match self
            .backend
            .submit_answer(&session_id, &question_id, &answer)
            .await
        {
            Ok(SubmitOutcome::NextQuestion(question)) => Resolution::Next(question),
            Ok(SubmitOutcome::Completed) => {
                info!(kind = %self.kind, %session_id, "assessment complete; fetching result");
                Resolution::from_result(self.backend.fetch_result(&session_id).await)
            }
            Ok(SubmitOutcome::Malformed(message)) => {
                Resolution::Failed(ApiError::MalformedResponse(message))
            }
            Err(e) => Resolution::Failed(e),
        };

        Ok(self.resolve(ticket, resolution).await)
    }

    /// Fetch the result again after the final answer was accepted but the
    /// result request failed.
    pub async fn retry_result(&self) -> Result<Phase, Rejection> {
        let (ticket, session_id) = {
            let mut state = self.state.lock().await;
            if state.in_flight.is_some() {
                return Err(Rejection::Busy);
            }
            if state.recovery() != Some(Recovery::RetryResult) {
                return Err(Rejection::NothingToRecover);
            }
            let Some(session_id) = state.session_id.clone() else {
                return Err(Rejection::NothingToRecover);
            };

            state.failure = None;
            state.in_flight = Some(InFlight::FetchingResult);
            self.commit(&state);
            (state.ticket(), session_id)
        };

        let resolution = Resolution::from_result(self.backend.fetch_result(&session_id).await);
        Ok(self.resolve(ticket, resolution).await)
    }

    async fn resolve(&self, ticket: Ticket, resolution: Resolution) -> Phase {
        let mut state = self.state.lock().await;
        if !state.matches(&ticket) {
            debug!(kind = %self.kind, "discarding response for a superseded session");
            return state.phase();
        }

        state.in_flight = None;
        let mut completed = None;
        match resolution {
            Resolution::Next(question) => {
                debug!(kind = %self.kind, question_id = %question.id, "next question");
                state.question = Some(question);
                state.result_pending = false;
            }
            Resolution::Finished(mut result) => {
                if let CompletedResult::Mbti(mbti) = &mut result {
                    if let Some(progress) = &state.progress {
                        mbti.total_questions = Some(progress.answered);
                    }
                }
                state.question = None;
                state.result_pending = false;
                state.result = Some(result.clone());
                completed = Some(result);
            }
            Resolution::ResultFailed(e) | Resolution::Failed(e) if e.is_session_expired() => {
                self.expire(&mut state, e);
                return state.phase();
            }
            Resolution::ResultFailed(e) => {
                warn!(kind = %self.kind, error = %e, "result fetch failed");
                state.failure = Some(e);
                state.result_pending = true;
            }
            Resolution::Failed(e) => {
                warn!(kind = %self.kind, error = %e, "submission failed; question kept for retry");
                if let Some(progress) = &mut state.progress {
                    progress.answered = progress.answered.saturating_sub(1);
                }
                state.failure = Some(e);
            }
        }
        self.commit(&state);

        if let Some(result) = completed {
            info!(kind = %self.kind, "assessment completed");
            self.cache.store(&result);
        }
        state.phase()
    }

    /// The backend lost the session: wipe it and go back to the start screen.
    fn expire(&self, state: &mut SessionState, error: ApiError) {
        warn!(kind = %self.kind, error = %error, "session expired; resetting");
        let user_label = state.user_label.take();
        *state = SessionState {
            user_label,
            notice: Some(error.message().to_string()),
            epoch: state.epoch + 1,
            ..SessionState::default()
        };
        PersistedSession::clear(self.store.as_ref(), self.kind);
        QuizProgress::clear(self.store.as_ref(), self.kind);
        self.publish(state);
    }

    /// Clear the error and return to the retained question (or the start screen).
    pub async fn dismiss(&self) -> Result<Phase, Rejection> {
        let mut state = self.state.lock().await;
        if state.phase() != Phase::Errored {
            return Err(Rejection::NothingToRecover);
        }
        state.failure = None;
        state.result_pending = false;
        self.commit(&state);
        Ok(state.phase())
    }

    /// Abandon this attempt and clear everything persisted for it.
    ///
    /// Returns the abandoned backend session id, if any, so the caller can end it.
    pub async fn restart(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        let abandoned = state.session_id.take();
        *state = SessionState {
            epoch: state.epoch + 1,
            ..SessionState::default()
        };
        Self::clear_persisted(self.store.as_ref(), self.kind);
        self.publish(&state);
        info!(kind = %self.kind, "assessment restarted");
        abandoned
    }

    /// Re-read persisted state, dropping any in-flight work.
    ///
    /// Used after another session cleared this one's storage.
    pub async fn reload(&self) {
        let mut state = self.state.lock().await;
        *state = SessionState::restored(
            PersistedSession::load(self.store.as_ref(), self.kind),
            QuizProgress::load(self.store.as_ref(), self.kind),
            state.epoch + 1,
        );
        self.publish(&state);
    }

    /// Remove everything stored for `kind`.
    ///
    /// The two assessments form one profile, so clearing MBTI also clears
    /// RIASEC's session and cached result.
    pub fn clear_persisted(store: &dyn KeyValueStore, kind: QuizKind) {
        let kinds: &[QuizKind] = match kind {
            QuizKind::Mbti => &[QuizKind::Mbti, QuizKind::Riasec],
            QuizKind::Riasec => &[QuizKind::Riasec],
        };
        for &kind in kinds {
            PersistedSession::clear(store, kind);
            QuizProgress::clear(store, kind);
            remove_key(store, result_key(kind));
        }
    }
}
