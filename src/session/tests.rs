use std::sync::Arc;

use crate::api::{ApiError, HttpAssessmentClient};
use crate::models::{Answer, CompletedResult, QuizKind};
use crate::protocol::SubmitOutcome;
use crate::storage::{
    KeyValueStore, MemoryStore, PersistedSession, ResultCache, result_key, session_key,
};
use crate::testing::{Call, FakeBackend, Route, mbti_result, serve, started, yes_no_question};

use super::{Phase, QuizProgress, QuizSession, Recovery, Rejection};

fn yes() -> Answer {
    Answer::Text("Yes".to_string())
}

fn session_with(backend: FakeBackend, store: &Arc<MemoryStore>) -> (Arc<FakeBackend>, QuizSession) {
    let backend = Arc::new(backend);
    let session = QuizSession::restore(backend.clone(), store.clone());
    (backend, session)
}

fn riasec_result() -> CompletedResult {
    serde_json::from_value(serde_json::json!({
        "riasec_code": "ASI",
        "axis_percents": {"R": 10, "I": 60, "A": 90, "S": 70, "E": 20, "C": 5},
        "raw_scores": {"R": 8, "I": 14, "A": 24, "S": 20, "E": 12, "C": 6},
    }))
    .unwrap()
}

#[tokio::test]
async fn test_start_reaches_first_question_and_persists() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend.on_start(Ok(started("s1", yes_no_question("q1", 1, 10))));
    let (backend, session) = session_with(backend, &store);

    assert_eq!(session.snapshot().phase, Phase::NotStarted);
    assert_eq!(session.start("  Ada ").await, Ok(Phase::AwaitingAnswer));
    assert_eq!(backend.calls(), vec![Call::Start("Ada".to_string())]);

    let persisted = PersistedSession::load(store.as_ref(), QuizKind::Mbti);
    assert_eq!(persisted.session_id.as_deref(), Some("s1"));
    assert_eq!(persisted.current_question.as_ref().map(|q| q.id.clone()), Some("q1".to_string()));
    assert_eq!(persisted.result, None);
    assert_eq!(persisted.user_label.as_deref(), Some("Ada"));
    assert!(QuizProgress::load(store.as_ref(), QuizKind::Mbti).is_some());
}

#[tokio::test]
async fn test_mbti_start_requires_label() {
    let store = Arc::new(MemoryStore::new());
    let (backend, session) = session_with(FakeBackend::new(QuizKind::Mbti), &store);

    assert_eq!(session.start("   ").await, Err(Rejection::LabelRequired));
    assert!(backend.calls().is_empty());
    assert_eq!(session.snapshot().phase, Phase::NotStarted);
}

#[tokio::test]
async fn test_riasec_start_sends_placeholder_label() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Riasec);
    backend.on_start(Ok(started("r1", yes_no_question("1", 1, 48))));
    let (backend, session) = session_with(backend, &store);

    assert_eq!(session.start("").await, Ok(Phase::AwaitingAnswer));
    assert_eq!(backend.calls(), vec![Call::Start("User".to_string())]);
    assert_eq!(session.snapshot().user_label, None);
}

#[tokio::test]
async fn test_start_twice_is_refused() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend.on_start(Ok(started("s1", yes_no_question("q1", 1, 10))));
    let (backend, session) = session_with(backend, &store);

    session.start("Ada").await.unwrap();
    assert_eq!(session.start("Ada").await, Err(Rejection::AlreadyStarted));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_start_failure_leaves_no_session() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend.on_start(Err(ApiError::StartFailed("MBTI start failed".to_string())));
    let (_backend, session) = session_with(backend, &store);

    assert_eq!(session.start("Ada").await, Ok(Phase::Errored));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.session_id, None);
    assert_eq!(snapshot.recovery, Some(Recovery::BackToStart));
    assert_eq!(snapshot.error_message(), Some("MBTI start failed"));

    assert_eq!(session.dismiss().await, Ok(Phase::NotStarted));
    assert_eq!(session.snapshot().error, None);
}

#[tokio::test]
async fn test_next_question_replaces_current() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 10))))
        .on_submit(Ok(SubmitOutcome::NextQuestion(yes_no_question("q2", 2, 10))));
    let (backend, session) = session_with(backend, &store);

    session.start("Ada").await.unwrap();
    assert_eq!(session.submit(yes()).await, Ok(Phase::AwaitingAnswer));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.question.as_ref().map(|q| q.id.clone()), Some("q2".to_string()));
    assert_eq!(snapshot.answered(), 1);
    assert_eq!(
        backend.calls()[1],
        Call::Submit {
            session_id: "s1".to_string(),
            question_id: "q1".to_string(),
            answer: yes(),
        }
    );
    assert_eq!(
        PersistedSession::load(store.as_ref(), QuizKind::Mbti)
            .current_question
            .map(|q| q.id),
        Some("q2".to_string())
    );
}

#[tokio::test]
async fn test_overlapping_submit_is_refused() {
    let store = Arc::new(MemoryStore::new());
    let (backend, gate) = FakeBackend::gated(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 10))))
        .on_submit(Ok(SubmitOutcome::NextQuestion(yes_no_question("q2", 2, 10))));
    let (backend, session) = session_with(backend, &store);
    let session = Arc::new(session);

    session.start("Ada").await.unwrap();
    let mut updates = session.subscribe();
    let first = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit(yes()).await }
    });

    updates
        .wait_for(|snapshot| snapshot.phase == Phase::Submitting)
        .await
        .unwrap();
    assert_eq!(
        session.submit(Answer::Text("No".to_string())).await,
        Err(Rejection::Busy)
    );

    gate.add_permits(1);
    assert_eq!(first.await.unwrap(), Ok(Phase::AwaitingAnswer));
    assert_eq!(backend.submit_count(), 1);
}

#[tokio::test]
async fn test_completion_fetches_result_once_and_caches_it() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 2))))
        .on_submit(Ok(SubmitOutcome::NextQuestion(yes_no_question("q2", 2, 2))))
        .on_submit(Ok(SubmitOutcome::Completed))
        .on_result(Ok(mbti_result("INTJ", 82.0)));
    let (backend, session) = session_with(backend, &store);

    session.start("Ada").await.unwrap();
    session.submit(yes()).await.unwrap();
    assert_eq!(session.submit(yes()).await, Ok(Phase::Completed));
    assert_eq!(backend.result_count(), 1);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.question, None);
    let mbti = snapshot.result.and_then(CompletedResult::into_mbti).unwrap();
    assert_eq!(mbti.mbti, "INTJ");
    assert_eq!(mbti.total_questions, Some(2));

    let cached = ResultCache::new(store.clone()).mbti().unwrap();
    assert_eq!(cached.mbti, "INTJ");
    assert_eq!(cached.total_questions, Some(2));

    let persisted = PersistedSession::load(store.as_ref(), QuizKind::Mbti);
    assert_eq!(persisted.current_question, None);
    assert!(persisted.result.is_some());

    assert_eq!(session.submit(yes()).await, Err(Rejection::NoPendingQuestion));
}

#[tokio::test]
async fn test_expired_session_resets_to_start() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 10))))
        .on_submit(Err(ApiError::expired("Session not found")));
    let (_backend, session) = session_with(backend, &store);

    session.start("Ada").await.unwrap();
    assert_eq!(session.submit(yes()).await, Ok(Phase::NotStarted));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.session_id, None);
    assert_eq!(snapshot.question, None);
    assert_eq!(snapshot.error, None);
    assert!(snapshot.notice.unwrap().contains("Session expired"));

    assert_eq!(
        PersistedSession::load(store.as_ref(), QuizKind::Mbti),
        PersistedSession::default()
    );
    assert_eq!(QuizProgress::load(store.as_ref(), QuizKind::Mbti), None);
}

#[tokio::test]
async fn test_http_404_on_submit_resets_to_start() {
    let base = serve(vec![
        Route::json(
            "sessionStart/Ada",
            200,
            serde_json::json!({
                "sessionID": "s1",
                "questionID": "q1",
                "currentIndex": 1,
                "maxQuestions": 10,
                "questionDesc": "Do you plan your weekends ahead?",
            }),
        ),
        Route::json("captureRes/s1", 404, serde_json::json!({"detail": "Session not found"})),
    ])
    .await;
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(HttpAssessmentClient::new(reqwest::Client::new(), base, QuizKind::Mbti));
    let session = QuizSession::restore(backend, store.clone());

    assert_eq!(session.start("Ada").await, Ok(Phase::AwaitingAnswer));
    assert_eq!(
        PersistedSession::load(store.as_ref(), QuizKind::Mbti).session_id.as_deref(),
        Some("s1")
    );

    assert_eq!(session.submit(yes()).await, Ok(Phase::NotStarted));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.session_id, None);
    assert!(snapshot.notice.as_deref().is_some_and(|n| n.contains("Session not found")));
    assert_eq!(
        PersistedSession::load(store.as_ref(), QuizKind::Mbti),
        PersistedSession::default()
    );
}

#[tokio::test]
async fn test_expiry_during_result_fetch_resets() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Riasec);
    backend
        .on_start(Ok(started("r1", yes_no_question("1", 1, 1))))
        .on_submit(Ok(SubmitOutcome::Completed))
        .on_result(Err(ApiError::expired("Session not found")));
    let (_backend, session) = session_with(backend, &store);

    session.start("").await.unwrap();
    assert_eq!(session.submit(Answer::Scale(4)).await, Ok(Phase::NotStarted));
    assert_eq!(store.get(&session_key(QuizKind::Riasec)).unwrap(), None);
}

#[tokio::test]
async fn test_submit_failure_keeps_question_for_retry() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 10))))
        .on_submit(Err(ApiError::SubmitFailed("MBTI capture failed: boom".to_string())))
        .on_submit(Ok(SubmitOutcome::NextQuestion(yes_no_question("q2", 2, 10))));
    let (_backend, session) = session_with(backend, &store);

    session.start("Ada").await.unwrap();
    assert_eq!(session.submit(yes()).await, Ok(Phase::Errored));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.recovery, Some(Recovery::Dismiss));
    assert_eq!(snapshot.question.as_ref().map(|q| q.id.clone()), Some("q1".to_string()));
    assert_eq!(snapshot.answered(), 0);
    assert_eq!(snapshot.error_message(), Some("MBTI capture failed: boom"));

    // Answering is blocked until the error is acknowledged.
    assert_eq!(session.submit(yes()).await, Err(Rejection::NoPendingQuestion));
    assert_eq!(session.dismiss().await, Ok(Phase::AwaitingAnswer));
    assert_eq!(session.submit(yes()).await, Ok(Phase::AwaitingAnswer));
    assert_eq!(session.snapshot().answered(), 1);
}

#[tokio::test]
async fn test_malformed_response_is_an_error() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 10))))
        .on_submit(Ok(SubmitOutcome::Malformed(
            "Unexpected response from server. Please try again.".to_string(),
        )));
    let (_backend, session) = session_with(backend, &store);

    session.start("Ada").await.unwrap();
    assert_eq!(session.submit(yes()).await, Ok(Phase::Errored));
    assert!(matches!(
        session.snapshot().error,
        Some(ApiError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_result_fetch_failure_can_be_retried() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Riasec);
    backend
        .on_start(Ok(started("r1", yes_no_question("1", 1, 1))))
        .on_submit(Ok(SubmitOutcome::Completed))
        .on_result(Err(ApiError::ResultFetchFailed("RIASEC result failed".to_string())))
        .on_result(Ok(riasec_result()));
    let (backend, session) = session_with(backend, &store);

    session.start("").await.unwrap();
    assert_eq!(session.submit(Answer::Scale(5)).await, Ok(Phase::Errored));
    assert_eq!(session.snapshot().recovery, Some(Recovery::RetryResult));

    assert_eq!(session.retry_result().await, Ok(Phase::Completed));
    assert_eq!(backend.result_count(), 2);
    assert_eq!(backend.submit_count(), 1);
    assert_eq!(
        ResultCache::new(store.clone()).riasec().map(|r| r.riasec_code),
        Some("ASI".to_string())
    );
}

#[tokio::test]
async fn test_recovery_requires_an_error() {
    let store = Arc::new(MemoryStore::new());
    let (_backend, session) = session_with(FakeBackend::new(QuizKind::Mbti), &store);

    assert_eq!(session.dismiss().await, Err(Rejection::NothingToRecover));
    assert_eq!(session.retry_result().await, Err(Rejection::NothingToRecover));
}

#[tokio::test]
async fn test_restart_clears_both_profiles() {
    let store = Arc::new(MemoryStore::new());
    PersistedSession {
        session_id: Some("r1".to_string()),
        current_question: None,
        result: Some(riasec_result()),
        user_label: None,
    }
    .save(store.as_ref(), QuizKind::Riasec);
    ResultCache::new(store.clone()).store(&riasec_result());

    let backend = FakeBackend::new(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 1))))
        .on_submit(Ok(SubmitOutcome::Completed))
        .on_result(Ok(mbti_result("ENFP", 64.0)));
    let (_backend, session) = session_with(backend, &store);
    session.start("Ada").await.unwrap();
    session.submit(yes()).await.unwrap();

    assert_eq!(session.restart().await, Some("s1".to_string()));
    assert_eq!(session.snapshot().phase, Phase::NotStarted);
    for kind in QuizKind::ALL {
        assert_eq!(store.get(&session_key(kind)).unwrap(), None);
        assert_eq!(store.get(&result_key(kind)).unwrap(), None);
    }
}

#[tokio::test]
async fn test_riasec_restart_keeps_mbti() {
    let store = Arc::new(MemoryStore::new());
    ResultCache::new(store.clone()).store(&mbti_result("INTJ", 82.0));
    let (_backend, session) = session_with(FakeBackend::new(QuizKind::Riasec), &store);

    assert_eq!(session.restart().await, None);
    assert!(ResultCache::new(store.clone()).mbti().is_some());
}

#[tokio::test]
async fn test_response_after_restart_is_discarded() {
    let store = Arc::new(MemoryStore::new());
    let (backend, gate) = FakeBackend::gated(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 10))))
        .on_submit(Ok(SubmitOutcome::NextQuestion(yes_no_question("q2", 2, 10))));
    let (_backend, session) = session_with(backend, &store);
    let session = Arc::new(session);

    session.start("Ada").await.unwrap();
    let mut updates = session.subscribe();
    let pending = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.submit(yes()).await }
    });
    updates
        .wait_for(|snapshot| snapshot.phase == Phase::Submitting)
        .await
        .unwrap();

    session.restart().await;
    gate.add_permits(1);
    assert_eq!(pending.await.unwrap(), Ok(Phase::NotStarted));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.question, None);
    assert_eq!(snapshot.session_id, None);
    assert_eq!(store.get(&session_key(QuizKind::Mbti)).unwrap(), None);
}

#[tokio::test]
async fn test_restore_resumes_question() {
    let store = Arc::new(MemoryStore::new());
    PersistedSession {
        session_id: Some("s1".to_string()),
        current_question: Some(yes_no_question("q4", 4, 10)),
        result: None,
        user_label: Some("Ada".to_string()),
    }
    .save(store.as_ref(), QuizKind::Mbti);

    let (_backend, session) = session_with(FakeBackend::new(QuizKind::Mbti), &store);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::AwaitingAnswer);
    assert_eq!(snapshot.question.as_ref().map(|q| q.position), Some(4));
    assert_eq!(snapshot.user_label.as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_restore_shows_completed_result() {
    let store = Arc::new(MemoryStore::new());
    PersistedSession {
        session_id: Some("s1".to_string()),
        current_question: Some(yes_no_question("q9", 9, 10)),
        result: Some(mbti_result("INTJ", 82.0)),
        user_label: Some("Ada".to_string()),
    }
    .save(store.as_ref(), QuizKind::Mbti);

    let (_backend, session) = session_with(FakeBackend::new(QuizKind::Mbti), &store);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, Phase::Completed);
    assert_eq!(snapshot.question, None);
}

#[tokio::test]
async fn test_restore_with_bare_session_id_can_start() {
    let store = Arc::new(MemoryStore::new());
    PersistedSession {
        session_id: Some("stale".to_string()),
        current_question: None,
        result: None,
        user_label: Some("Ada".to_string()),
    }
    .save(store.as_ref(), QuizKind::Mbti);

    let backend = FakeBackend::new(QuizKind::Mbti);
    backend.on_start(Ok(started("s2", yes_no_question("q1", 1, 10))));
    let (_backend, session) = session_with(backend, &store);
    assert_eq!(session.snapshot().phase, Phase::NotStarted);
    assert_eq!(session.snapshot().session_id, None);

    assert_eq!(session.start("Ada").await, Ok(Phase::AwaitingAnswer));
    assert_eq!(session.snapshot().session_id.as_deref(), Some("s2"));
}

#[tokio::test]
async fn test_reload_picks_up_external_clear() {
    let store = Arc::new(MemoryStore::new());
    PersistedSession {
        session_id: Some("r1".to_string()),
        current_question: None,
        result: Some(riasec_result()),
        user_label: None,
    }
    .save(store.as_ref(), QuizKind::Riasec);

    let (_backend, riasec) = session_with(FakeBackend::new(QuizKind::Riasec), &store);
    assert_eq!(riasec.snapshot().phase, Phase::Completed);

    QuizSession::clear_persisted(store.as_ref(), QuizKind::Mbti);
    riasec.reload().await;
    assert_eq!(riasec.snapshot().phase, Phase::NotStarted);
}

#[tokio::test]
async fn test_full_mbti_walkthrough() {
    let store = Arc::new(MemoryStore::new());
    let backend = FakeBackend::new(QuizKind::Mbti);
    backend
        .on_start(Ok(started("s1", yes_no_question("q1", 1, 2))))
        .on_submit(Ok(SubmitOutcome::NextQuestion(yes_no_question("q2", 2, 2))))
        .on_submit(Ok(SubmitOutcome::Completed))
        .on_result(Ok(mbti_result("INTJ", 82.0)));
    let (backend, session) = session_with(backend, &store);

    session.start("Ada").await.unwrap();
    session.submit(yes()).await.unwrap();
    session.submit(Answer::Text("No".to_string())).await.unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            Call::Start("Ada".to_string()),
            Call::Submit {
                session_id: "s1".to_string(),
                question_id: "q1".to_string(),
                answer: yes(),
            },
            Call::Submit {
                session_id: "s1".to_string(),
                question_id: "q2".to_string(),
                answer: Answer::Text("No".to_string()),
            },
            Call::Result("s1".to_string()),
        ]
    );

    // A fresh process sees the finished result.
    let (_backend, resumed) = session_with(FakeBackend::new(QuizKind::Mbti), &store);
    let snapshot = resumed.snapshot();
    assert_eq!(snapshot.phase, Phase::Completed);
    assert_eq!(
        snapshot.result.and_then(CompletedResult::into_mbti).map(|m| m.confidence),
        Some(82.0)
    );
}
