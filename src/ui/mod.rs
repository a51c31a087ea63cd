mod dashboard;
mod quiz;
mod result;
mod welcome;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::{App, View};
use crate::models::QuizKind;
use crate::session::{Phase, Recovery, SessionSnapshot};

const METER_FULL: char = '█';
const METER_EMPTY: char = '░';

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match app.view {
        View::Dashboard => dashboard::render(frame, area, app),
        View::Quiz(kind) => render_quiz(frame, area, app, kind),
    }
}

fn render_quiz(frame: &mut Frame, area: Rect, app: &App, kind: QuizKind) {
    let snapshot = app.snapshot(kind);
    match snapshot.phase {
        Phase::NotStarted => welcome::render(frame, area, app, &snapshot),
        Phase::Starting => render_busy(frame, area, kind, "Starting your assessment..."),
        Phase::Submitting => {
            let last = snapshot
                .question
                .as_ref()
                .is_some_and(|q| q.position >= q.total);
            let message = if last {
                "Calculating your results..."
            } else {
                "Submitting your answer..."
            };
            render_busy(frame, area, kind, message);
        }
        Phase::AwaitingAnswer => quiz::render(frame, area, app, &snapshot),
        Phase::Completed => result::render(frame, area, app, &snapshot),
        Phase::Errored => render_error(frame, area, &snapshot),
    }
}

fn render_busy(frame: &mut Frame, area: Rect, kind: QuizKind, message: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(7),
        Constraint::Percentage(40),
    ])
    .split(area);

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{kind} ASSESSMENT"),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from("Esc dashboard  ·  q quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, chunks[1]);
}

fn render_error(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let chunks = Layout::vertical([
        Constraint::Percentage(30),
        Constraint::Length(11),
        Constraint::Percentage(30),
    ])
    .split(area);

    let action = match snapshot.recovery {
        Some(Recovery::Dismiss) => "[Enter] try this question again",
        Some(Recovery::RetryResult) => "[Enter] fetch the result again",
        Some(Recovery::BackToStart) | None => "[Enter] back to the start screen",
    };

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "SOMETHING WENT WRONG",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            snapshot.error_message().unwrap_or("Unknown error"),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(action, Style::default().fg(Color::Green).bold())),
        Line::from(""),
        Line::from("r restart  ·  Esc dashboard  ·  q quit".fg(Color::DarkGray)),
    ];

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(panel(" Error ").border_style(Style::default().fg(Color::Red)));
    frame.render_widget(widget, chunks[1]);
}

/// Bordered block with a cyan title, as used by every panel.
pub(crate) fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
        .title_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1))
}

pub(crate) fn render_controls(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

/// Text bar for a 0-100 value.
pub(crate) fn meter(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n(METER_FULL, filled));
    bar.extend(std::iter::repeat_n(METER_EMPTY, width - filled));
    bar
}

pub(crate) fn format_elapsed(secs: i64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
