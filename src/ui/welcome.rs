use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::QuizKind;
use crate::session::SessionSnapshot;

pub fn render(frame: &mut Frame, area: Rect, app: &App, snapshot: &SessionSnapshot) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(16),
        Constraint::Fill(1),
    ])
    .split(area);

    let (title, blurb) = match snapshot.kind {
        QuizKind::Mbti => (
            "MBTI PERSONALITY ASSESSMENT",
            "Yes / No questions · discover your four-letter type",
        ),
        QuizKind::Riasec => (
            "RIASEC INTEREST ASSESSMENT",
            "Rate each activity from 1 to 5 · discover your Holland code",
        ),
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(title, Style::default().fg(Color::Cyan).bold())),
        Line::from(""),
        Line::from(blurb.fg(Color::DarkGray)),
        Line::from(""),
    ];

    match &snapshot.notice {
        Some(notice) => content.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ))),
        None => content.push(Line::from("")),
    }
    content.push(Line::from(""));

    if snapshot.kind.requires_user_label() {
        content.push(Line::from(vec![
            Span::styled("Enter your name: ", Style::default().fg(Color::White)),
            Span::styled(app.name_input(), Style::default().fg(Color::Yellow)),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]));
        content.push(Line::from(""));
        match app.input_error() {
            Some(err) => content.push(Line::from(Span::styled(
                err,
                Style::default().fg(Color::Red),
            ))),
            None => content.push(Line::from("")),
        }
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "ENTER",
        Style::default().fg(Color::Green).bold(),
    )));
    content.push(Line::from("to start".fg(Color::DarkGray)));
    content.push(Line::from(""));
    content.push(Line::from("Esc dashboard".fg(Color::DarkGray)));

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        );

    frame.render_widget(widget, chunks[1]);
}
