//! Terminal application state: which screen is showing, transient input,
//! and the glue that turns key presses into session operations.

use std::sync::Arc;

use crossterm::event::KeyCode;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::api::{ApiError, RecommendationBackend};
use crate::dashboard::Dashboard;
use crate::models::{Answer, ClusterRecommendation, QuizKind};
use crate::presentation::TraitTally;
use crate::session::{Phase, QuizSession, Recovery, Rejection, SessionSnapshot};
use crate::storage::ResultCache;

const MAX_NAME_LEN: usize = 32;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Quiz(QuizKind),
}

/// Completion notices from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    /// A session operation returned.
    Finished {
        kind: QuizKind,
        outcome: Result<Phase, Rejection>,
    },
    /// The backend accepted an answer.
    Answered {
        kind: QuizKind,
        question_text: String,
        answer: Answer,
    },
    Restarted(QuizKind),
    Recommendations {
        id: u64,
        result: Result<Vec<ClusterRecommendation>, ApiError>,
    },
}

struct QuizHandle {
    session: Arc<QuizSession>,
    updates: watch::Receiver<SessionSnapshot>,
    /// Question the selection cursor belongs to.
    question_id: Option<String>,
}

impl QuizHandle {
    fn new(session: Arc<QuizSession>) -> Self {
        let updates = session.subscribe();
        Self {
            session,
            updates,
            question_id: None,
        }
    }
}

pub struct App {
    pub view: View,
    pub should_quit: bool,
    mbti: QuizHandle,
    riasec: QuizHandle,
    dashboard: Dashboard,
    recommender: Arc<dyn RecommendationBackend>,
    name_input: String,
    input_error: Option<String>,
    selected_choice: usize,
    result_scroll: u16,
    /// Dominant-trait tally for the MBTI question view.
    tally: TraitTally,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(
        mbti: Arc<QuizSession>,
        riasec: Arc<QuizSession>,
        cache: ResultCache,
        recommender: Arc<dyn RecommendationBackend>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let name_input = mbti.snapshot().user_label.unwrap_or_default();
        Self {
            view: View::Dashboard,
            should_quit: false,
            mbti: QuizHandle::new(mbti),
            riasec: QuizHandle::new(riasec),
            dashboard: Dashboard::new(cache),
            recommender,
            name_input,
            input_error: None,
            selected_choice: 0,
            result_scroll: 0,
            tally: TraitTally::default(),
            events_tx,
            events_rx,
        }
    }

    fn handle(&self, kind: QuizKind) -> &QuizHandle {
        match kind {
            QuizKind::Mbti => &self.mbti,
            QuizKind::Riasec => &self.riasec,
        }
    }

    fn handle_mut(&mut self, kind: QuizKind) -> &mut QuizHandle {
        match kind {
            QuizKind::Mbti => &mut self.mbti,
            QuizKind::Riasec => &mut self.riasec,
        }
    }

    /// Latest published state of `kind`'s session.
    pub fn snapshot(&self, kind: QuizKind) -> SessionSnapshot {
        self.handle(kind).updates.borrow().clone()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn name_input(&self) -> &str {
        &self.name_input
    }

    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn selected_choice(&self) -> usize {
        self.selected_choice
    }

    pub fn result_scroll(&self) -> u16 {
        self.result_scroll
    }

    pub fn tally(&self) -> &TraitTally {
        &self.tally
    }

    /// Show the dashboard and ask for recommendations if both results exist.
    pub fn enter_dashboard(&mut self) {
        self.view = View::Dashboard;
        self.dashboard.refresh();
        if let Some(request) = self.dashboard.begin_request() {
            let recommender = Arc::clone(&self.recommender);
            let tx = self.events_tx.clone();
            tokio::spawn(async move {
                let (id, result) = request.send(recommender.as_ref()).await;
                let _ = tx.send(AppEvent::Recommendations { id, result });
            });
        }
    }

    pub fn open_quiz(&mut self, kind: QuizKind) {
        if self.view == View::Dashboard {
            self.dashboard.leave();
        }
        self.view = View::Quiz(kind);
        self.input_error = None;
        self.result_scroll = 0;
        self.sync(kind);
    }

    /// Pick up new snapshots and apply finished background work.
    pub fn tick(&mut self) {
        for kind in QuizKind::ALL {
            if self.handle(kind).updates.has_changed().unwrap_or(false) {
                self.sync(kind);
            }
        }
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
    }

    /// Wait for the next background event and apply it.
    pub async fn next_event(&mut self) -> Option<()> {
        let event = self.events_rx.recv().await?;
        self.apply(event);
        for kind in QuizKind::ALL {
            self.sync(kind);
        }
        Some(())
    }

    fn sync(&mut self, kind: QuizKind) {
        let handle = self.handle_mut(kind);
        let snapshot = handle.updates.borrow_and_update().clone();
        let question_id = snapshot.question.as_ref().map(|q| q.id.clone());
        let moved_on = handle.question_id != question_id;
        handle.question_id = question_id;

        if moved_on && self.view == View::Quiz(kind) {
            self.selected_choice = 0;
        }
        if kind == QuizKind::Mbti && snapshot.phase == Phase::NotStarted {
            self.tally.clear();
        }
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Finished { kind, outcome } => match outcome {
                Ok(phase) => debug!(%kind, ?phase, "operation finished"),
                Err(Rejection::LabelRequired) => {
                    self.input_error = Some(Rejection::LabelRequired.to_string());
                }
                Err(rejection) => debug!(%kind, %rejection, "operation refused"),
            },
            AppEvent::Answered {
                kind: QuizKind::Mbti,
                question_text,
                answer,
            } => self.tally.record(&question_text, &answer),
            AppEvent::Answered { .. } => {}
            AppEvent::Restarted(kind) => {
                if kind == QuizKind::Mbti {
                    self.tally.clear();
                }
                self.result_scroll = 0;
                if self.view == View::Dashboard {
                    self.enter_dashboard();
                }
            }
            AppEvent::Recommendations { id, result } => self.dashboard.apply(id, result),
        }
    }

    pub fn start(&mut self, kind: QuizKind) {
        let session = Arc::clone(&self.handle(kind).session);
        let label = self.name_input.clone();
        let tx = self.events_tx.clone();
        self.input_error = None;
        tokio::spawn(async move {
            let outcome = session.start(&label).await;
            let _ = tx.send(AppEvent::Finished { kind, outcome });
        });
    }

    pub fn submit_selected(&mut self, kind: QuizKind) {
        let snapshot = self.snapshot(kind);
        let Some(question) = snapshot.question else {
            return;
        };
        let Some(choice) = question.choice(self.selected_choice) else {
            return;
        };

        let answer = choice.answer.clone();
        let session = Arc::clone(&self.handle(kind).session);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = session.submit(answer.clone()).await;
            if matches!(outcome, Ok(phase) if phase != Phase::Errored) {
                let _ = tx.send(AppEvent::Answered {
                    kind,
                    question_text: question.text,
                    answer,
                });
            }
            let _ = tx.send(AppEvent::Finished { kind, outcome });
        });
    }

    pub fn recover(&mut self, kind: QuizKind) {
        match self.snapshot(kind).recovery {
            Some(Recovery::Dismiss | Recovery::BackToStart) => {
                let session = Arc::clone(&self.handle(kind).session);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = session.dismiss().await;
                    let _ = tx.send(AppEvent::Finished { kind, outcome });
                });
            }
            Some(Recovery::RetryResult) => {
                let session = Arc::clone(&self.handle(kind).session);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = session.retry_result().await;
                    let _ = tx.send(AppEvent::Finished { kind, outcome });
                });
            }
            None => {}
        }
    }

    /// Wipe `kind`'s attempt. Restarting MBTI also resets RIASEC.
    pub fn restart(&mut self, kind: QuizKind) {
        let session = Arc::clone(&self.handle(kind).session);
        let paired = (kind == QuizKind::Mbti).then(|| Arc::clone(&self.riasec.session));
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            if let Some(session_id) = session.restart().await {
                let backend = session.backend();
                tokio::spawn(async move {
                    if let Err(e) = backend.end_session(&session_id).await {
                        warn!(%session_id, error = %e, "could not end abandoned session");
                    }
                });
            }
            if let Some(paired) = paired {
                paired.reload().await;
            }
            let _ = tx.send(AppEvent::Restarted(kind));
        });
    }

    pub fn select_next_choice(&mut self, kind: QuizKind) {
        let count = self.choice_count(kind);
        if count > 0 {
            self.selected_choice = (self.selected_choice + 1) % count;
        }
    }

    pub fn select_previous_choice(&mut self, kind: QuizKind) {
        let count = self.choice_count(kind);
        if count > 0 {
            self.selected_choice = (self.selected_choice + count - 1) % count;
        }
    }

    fn choice_count(&self, kind: QuizKind) -> usize {
        self.handle(kind)
            .updates
            .borrow()
            .question
            .as_ref()
            .map_or(0, |q| q.choices.len())
    }

    /// Route a key press to the current screen. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key),
            View::Quiz(kind) => self.handle_quiz_key(kind, key),
        }
        self.should_quit
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('1') | KeyCode::Char('m') => self.open_quiz(QuizKind::Mbti),
            KeyCode::Char('2') | KeyCode::Char('r') => self.open_quiz(QuizKind::Riasec),
            KeyCode::Char('c') => self.enter_dashboard(),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, kind: QuizKind, key: KeyCode) {
        let phase = self.snapshot(kind).phase;
        match phase {
            Phase::NotStarted => self.handle_welcome_key(kind, key),
            Phase::Starting | Phase::Submitting => match key {
                KeyCode::Esc => self.enter_dashboard(),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
            Phase::AwaitingAnswer => match key {
                KeyCode::Up | KeyCode::Char('k') => self.select_previous_choice(kind),
                KeyCode::Down | KeyCode::Char('j') => self.select_next_choice(kind),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    if index < self.choice_count(kind) {
                        self.selected_choice = index;
                        self.submit_selected(kind);
                    }
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.submit_selected(kind),
                KeyCode::Char('R') => self.restart(kind),
                KeyCode::Esc => self.enter_dashboard(),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
            Phase::Completed => match key {
                KeyCode::Down | KeyCode::Char('j') => {
                    self.result_scroll = self.result_scroll.saturating_add(1);
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.result_scroll = self.result_scroll.saturating_sub(1);
                }
                KeyCode::Char('r') | KeyCode::Char('R') => self.restart(kind),
                KeyCode::Esc | KeyCode::Char('d') => self.enter_dashboard(),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
            Phase::Errored => match key {
                KeyCode::Enter => self.recover(kind),
                KeyCode::Char('r') | KeyCode::Char('R') => self.restart(kind),
                KeyCode::Esc => self.enter_dashboard(),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            },
        }
    }

    fn handle_welcome_key(&mut self, kind: QuizKind, key: KeyCode) {
        if !kind.requires_user_label() {
            match key {
                KeyCode::Enter => self.start(kind),
                KeyCode::Esc => self.enter_dashboard(),
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Enter => self.start(kind),
            KeyCode::Esc => self.enter_dashboard(),
            KeyCode::Backspace => {
                self.input_error = None;
                self.name_input.pop();
            }
            KeyCode::Char(c) if !c.is_control() => {
                self.input_error = None;
                if self.name_input.chars().count() < MAX_NAME_LEN {
                    self.name_input.push(c);
                }
            }
            _ => {}
        }
    }
}
