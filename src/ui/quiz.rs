use chrono::Utc;
use ratatui::{
    prelude::*,
    widgets::{Gauge, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{Choice, QuizKind, Question};
use crate::presentation::{classify_question, display_letter};
use crate::session::SessionSnapshot;

use super::{format_elapsed, panel, render_controls};

pub fn render(frame: &mut Frame, area: Rect, app: &App, snapshot: &SessionSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Progress
        Constraint::Length(1), // Dimension hint
        Constraint::Length(5), // Question text
        Constraint::Fill(1),   // Choices
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], question, snapshot);
    render_progress(frame, chunks[1], question);
    if snapshot.kind == QuizKind::Mbti {
        render_dimension_hint(frame, chunks[2], app, &question.text);
    }
    render_question_text(frame, chunks[3], &question.text);
    render_choices(frame, chunks[4], &question.choices, app.selected_choice());
    render_controls(
        frame,
        chunks[5],
        "j/k navigate  ·  enter/1-9 answer  ·  R restart  ·  Esc dashboard  ·  q quit",
    );
}

fn render_header(frame: &mut Frame, area: Rect, question: &Question, snapshot: &SessionSnapshot) {
    let who = snapshot
        .user_label
        .as_deref()
        .map(|name| format!("  ·  {name}"))
        .unwrap_or_default();
    let left = Line::from(vec![
        Span::styled(
            format!("{} ASSESSMENT", snapshot.kind),
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::styled(who, Style::default().fg(Color::DarkGray)),
    ]);
    let right = format!(
        "{}/{}  ·  {}",
        question.position,
        question.total,
        format_elapsed(snapshot.elapsed_secs(Utc::now()))
    );

    frame.render_widget(Paragraph::new(left), area);
    frame.render_widget(
        Paragraph::new(right)
            .alignment(Alignment::Right)
            .fg(Color::DarkGray),
        area,
    );
}

fn render_progress(frame: &mut Frame, area: Rect, question: &Question) {
    let percent = question.progress_percent().min(100);
    let widget = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(percent)
        .label(format!("{percent}% complete"));
    frame.render_widget(widget, area);
}

/// Category of the question and which side of it the user's answers lean to so far.
fn render_dimension_hint(frame: &mut Frame, area: Rect, app: &App, text: &str) {
    let topic = classify_question(text);
    let mut spans = vec![Span::styled(
        topic.category.label(),
        Style::default().fg(Color::Magenta).bold(),
    )];

    if let Some((shown, word)) = app
        .tally()
        .dominant(topic.category)
        .and_then(display_letter)
    {
        spans.push(Span::styled(
            format!("  ·  leaning {shown} ({word})"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold()
        .block(panel(" Question "));
    frame.render_widget(widget, area);
}

fn render_choices(frame: &mut Frame, area: Rect, choices: &[Choice], selected: usize) {
    let mut lines: Vec<Line> = Vec::with_capacity(choices.len() * 2);

    for (index, choice) in choices.iter().enumerate() {
        let is_selected = index == selected;
        let style = if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let marker = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} "), style),
            Span::styled(format!("{}. ", index + 1), style),
            Span::styled(choice.label.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    frame.render_widget(Paragraph::new(lines).block(panel(" Your answer ")), area);
}
