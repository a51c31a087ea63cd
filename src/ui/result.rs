use chrono::Utc;
use ratatui::{
    prelude::*,
    widgets::{Gauge, Paragraph, Wrap},
};

use crate::app::App;
use crate::models::{CompletedResult, MbtiResult, RiasecAxis, RiasecResult};
use crate::presentation::{
    Level, axis_info, decode_holland_code, display_code, trait_strengths, type_profile,
};
use crate::session::SessionSnapshot;

use super::{format_elapsed, meter, panel, render_controls};

const METER_WIDTH: usize = 24;

pub fn render(frame: &mut Frame, area: Rect, app: &App, snapshot: &SessionSnapshot) {
    let Some(result) = &snapshot.result else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(6), // Headline
        Constraint::Length(3), // Confidence
        Constraint::Fill(1),   // Detail
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    match result {
        CompletedResult::Mbti(mbti) => {
            render_mbti_headline(frame, chunks[0], mbti, snapshot);
            render_confidence(frame, chunks[1], mbti.confidence);
            render_mbti_detail(frame, chunks[2], mbti, app.result_scroll());
        }
        CompletedResult::Riasec(riasec) => {
            render_riasec_headline(frame, chunks[0], riasec);
            render_confidence(frame, chunks[1], riasec.confidence_pct);
            render_riasec_detail(frame, chunks[2], riasec, app.result_scroll());
        }
    }

    render_controls(
        frame,
        chunks[3],
        "j/k scroll  ·  r retake  ·  Esc dashboard  ·  q quit",
    );
}

fn render_mbti_headline(frame: &mut Frame, area: Rect, mbti: &MbtiResult, snapshot: &SessionSnapshot) {
    let profile = type_profile(&mbti.mbti);
    let mut content = vec![
        Line::from(vec![
            Span::styled(mbti.mbti.clone(), Style::default().fg(Color::Cyan).bold()),
            Span::styled(
                format!("  ({})", display_code(&mbti.mbti)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            profile.map_or("Your personality type", |p| p.title),
            Style::default().fg(Color::White).bold(),
        )),
    ];
    if let Some(profile) = profile {
        content.push(Line::from(profile.description.fg(Color::Gray)));
    }

    let answered = mbti.total_questions.unwrap_or_else(|| snapshot.answered());
    content.push(Line::from(
        format!(
            "{answered} questions answered  ·  {}",
            format_elapsed(snapshot.elapsed_secs(Utc::now()))
        )
        .fg(Color::DarkGray),
    ));

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_riasec_headline(frame: &mut Frame, area: Rect, riasec: &RiasecResult) {
    let content = vec![
        Line::from(Span::styled(
            riasec.riasec_code.clone(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(Span::styled(
            decode_holland_code(&riasec.riasec_code),
            Style::default().fg(Color::White).bold(),
        )),
        Line::from(
            format!("{} of {} questions answered", riasec.answered, riasec.total)
                .fg(Color::DarkGray),
        ),
    ];

    let widget = Paragraph::new(content).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

fn render_confidence(frame: &mut Frame, area: Rect, confidence: f64) {
    let level = Level::for_confidence(confidence);
    let percent = confidence.round().clamp(0.0, 100.0) as u16;
    let widget = Gauge::default()
        .block(panel(" Confidence "))
        .gauge_style(Style::default().fg(level.color()).bg(Color::Black))
        .percent(percent)
        .label(format!("{percent}% ({})", level.label()));
    frame.render_widget(widget, area);
}

fn render_mbti_detail(frame: &mut Frame, area: Rect, mbti: &MbtiResult, scroll: u16) {
    let lines: Vec<Line> = trait_strengths(&mbti.mean_probs)
        .into_iter()
        .map(|strength| {
            let style = Style::default().fg(strength.level.color());
            Line::from(vec![
                Span::styled(format!("{:<5}", strength.axis), style.bold()),
                Span::styled(meter(strength.percent() as f64, METER_WIDTH), style),
                Span::styled(
                    format!(" {:>3}%  {}", strength.percent(), strength.level.label()),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(panel(" Trait Strengths "))
        .scroll((scroll, 0));
    frame.render_widget(widget, area);
}

fn render_riasec_detail(frame: &mut Frame, area: Rect, riasec: &RiasecResult, scroll: u16) {
    let mut lines: Vec<Line> = RiasecAxis::ALL
        .into_iter()
        .map(|axis| {
            let percent = riasec.percent(axis);
            Line::from(vec![
                Span::styled(
                    format!("{} {:<14}", axis_info(axis).icon, axis.name()),
                    Style::default().fg(Color::White),
                ),
                Span::styled(meter(percent, METER_WIDTH), Style::default().fg(Color::Cyan)),
                Span::styled(format!(" {percent:>5.1}%"), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Top interests",
        Style::default().fg(Color::Cyan).bold(),
    )));

    for (rank, axis) in riasec.top_axes().into_iter().enumerate() {
        let info = axis_info(axis);
        lines.push(Line::from(vec![
            Span::styled(format!("{}. ", rank + 1), Style::default().fg(Color::Yellow).bold()),
            Span::styled(
                format!("{} {} · {}", info.icon, axis.name(), info.subtitle),
                Style::default().fg(Color::White).bold(),
            ),
        ]));
        lines.push(Line::from(format!("   {}", info.description).fg(Color::Gray)));

        if let Some(metrics) = riasec.metrics_for(axis) {
            lines.push(Line::from(
                format!(
                    "   {:.1}% ± {:.1}  (95% CI {:.1}-{:.1})",
                    riasec.percent(axis),
                    metrics.margin(),
                    metrics.ci_95_lower,
                    metrics.ci_95_upper
                )
                .fg(Color::DarkGray),
            ));
        }
    }

    let widget = Paragraph::new(lines)
        .block(panel(" Interest Profile "))
        .scroll((scroll, 0));
    frame.render_widget(widget, area);
}
