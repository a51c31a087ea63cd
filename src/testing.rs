//! Scripted backends for driving sessions and the dashboard in tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Url;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::api::{ApiError, AssessmentBackend, RecommendationBackend};
use crate::models::{
    Answer, Choice, ClusterRecommendation, CompletedResult, MbtiResult, QuizKind, Question,
    RiasecScores,
};
use crate::protocol::{StartedSession, SubmitOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(String),
    Submit {
        session_id: String,
        question_id: String,
        answer: Answer,
    },
    Result(String),
    End(String),
}

#[derive(Default)]
struct Script {
    starts: VecDeque<Result<StartedSession, ApiError>>,
    submits: VecDeque<Result<SubmitOutcome, ApiError>>,
    results: VecDeque<Result<CompletedResult, ApiError>>,
    calls: Vec<Call>,
}

/// An [`AssessmentBackend`] that replays queued responses and records every call.
pub struct FakeBackend {
    kind: QuizKind,
    script: Mutex<Script>,
    /// When set, `submit_answer` waits for a permit before answering.
    submit_gate: Option<Arc<Semaphore>>,
}

impl FakeBackend {
    pub fn new(kind: QuizKind) -> Self {
        Self {
            kind,
            script: Mutex::new(Script::default()),
            submit_gate: None,
        }
    }

    /// Hold every submission until a permit is added to the returned semaphore.
    pub fn gated(kind: QuizKind) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let mut backend = Self::new(kind);
        backend.submit_gate = Some(Arc::clone(&gate));
        (backend, gate)
    }

    pub fn on_start(&self, response: Result<StartedSession, ApiError>) -> &Self {
        self.script.lock().unwrap().starts.push_back(response);
        self
    }

    pub fn on_submit(&self, response: Result<SubmitOutcome, ApiError>) -> &Self {
        self.script.lock().unwrap().submits.push_back(response);
        self
    }

    pub fn on_result(&self, response: Result<CompletedResult, ApiError>) -> &Self {
        self.script.lock().unwrap().results.push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn submit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Submit { .. }))
            .count()
    }

    pub fn result_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Result(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.script.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl AssessmentBackend for FakeBackend {
    fn kind(&self) -> QuizKind {
        self.kind
    }

    async fn start(&self, user_label: &str) -> Result<StartedSession, ApiError> {
        self.record(Call::Start(user_label.to_string()));
        self.script
            .lock()
            .unwrap()
            .starts
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::StartFailed("no scripted start".to_string())))
    }

    async fn submit_answer(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &Answer,
    ) -> Result<SubmitOutcome, ApiError> {
        self.record(Call::Submit {
            session_id: session_id.to_string(),
            question_id: question_id.to_string(),
            answer: answer.clone(),
        });
        if let Some(gate) = &self.submit_gate {
            gate.acquire().await.unwrap().forget();
        }
        self.script
            .lock()
            .unwrap()
            .submits
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::SubmitFailed("no scripted submit".to_string())))
    }

    async fn fetch_result(&self, session_id: &str) -> Result<CompletedResult, ApiError> {
        self.record(Call::Result(session_id.to_string()));
        self.script
            .lock()
            .unwrap()
            .results
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::ResultFetchFailed("no scripted result".to_string())))
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ApiError> {
        self.record(Call::End(session_id.to_string()));
        Ok(())
    }
}

/// A [`RecommendationBackend`] with one queued answer per call.
#[derive(Default)]
pub struct FakeRecommender {
    responses: Mutex<VecDeque<Result<Vec<ClusterRecommendation>, ApiError>>>,
    requests: Mutex<Vec<(String, RiasecScores)>>,
}

impl FakeRecommender {
    pub fn respond(&self, response: Result<Vec<ClusterRecommendation>, ApiError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<(String, RiasecScores)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationBackend for FakeRecommender {
    async fn recommend(
        &self,
        personality_type: &str,
        raw_interest_scores: &RiasecScores,
    ) -> Result<Vec<ClusterRecommendation>, ApiError> {
        self.requests
            .lock()
            .unwrap()
            .push((personality_type.to_string(), raw_interest_scores.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

pub fn yes_no_question(id: &str, position: u32, total: u32) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {id}"),
        position,
        total,
        choices: ["Yes", "No"]
            .into_iter()
            .map(|label| Choice {
                label: label.to_string(),
                answer: Answer::Text(label.to_string()),
            })
            .collect(),
    }
}

pub fn started(session_id: &str, question: Question) -> StartedSession {
    StartedSession {
        session_id: session_id.to_string(),
        question,
    }
}

pub fn mbti_result(code: &str, confidence: f64) -> CompletedResult {
    CompletedResult::Mbti(MbtiResult {
        mbti: code.to_string(),
        confidence,
        mean_probs: vec![0.3, 0.7, 0.35, 0.8],
        std_probs: Vec::new(),
        entropy: None,
        features: Vec::new(),
        total_questions: None,
    })
}

pub fn cluster(name: &str, probability: f64) -> ClusterRecommendation {
    serde_json::from_value(serde_json::json!({
        "cluster": name,
        "probability": probability,
        "explanation": format!("{name} suits you."),
    }))
    .unwrap()
}

/// One canned reply: requests whose path contains `path` get `status` and `body`.
#[derive(Debug, Clone)]
pub struct Route {
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn json(path: &'static str, status: u16, body: serde_json::Value) -> Self {
        Self {
            path,
            status,
            body: body.to_string(),
        }
    }

    pub fn text(path: &'static str, status: u16, body: &str) -> Self {
        Self {
            path,
            status,
            body: body.to_string(),
        }
    }
}

/// Serve `routes` over plain HTTP on a loopback port until the runtime shuts down.
/// Unmatched requests get a bare 404.
pub async fn serve(routes: Vec<Route>) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(reply(socket, Arc::clone(&routes)));
        }
    });

    Url::parse(&format!("http://{addr}")).unwrap()
}

/// A base URL nothing is listening on.
pub async fn unreachable_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

async fn reply(mut socket: TcpStream, routes: Arc<Vec<Route>>) {
    let Some(request_line) = read_request(&mut socket).await else {
        return;
    };
    let (status, body) = routes
        .iter()
        .find(|route| request_line.contains(route.path))
        .map_or((404, String::new()), |route| (route.status, route.body.clone()));
    let content_type = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
        "application/json"
    } else {
        "text/plain"
    };

    let response = format!(
        "HTTP/1.1 {status} Canned\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Read one request (head and body) and return its request line.
async fn read_request(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    while buf.len() < head_end + 4 + length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head.lines().next().map(str::to_string)
}
