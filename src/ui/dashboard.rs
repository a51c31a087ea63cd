use ratatui::{
    prelude::*,
    widgets::{Paragraph, Wrap},
};

use crate::app::App;
use crate::dashboard::Recommendations;
use crate::models::{ClusterRecommendation, QuizKind};
use crate::presentation::{Level, axis_info, display_code, type_profile};

use super::{panel, render_controls};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Title
        Constraint::Length(7), // Profiles
        Constraint::Fill(1),   // Recommendations
        Constraint::Length(1), // Controls
    ])
    .margin(1)
    .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled(
            "CAREER COMPASS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from("Personality + interests = career clusters".fg(Color::DarkGray)),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let [left, right] = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)])
        .spacing(1)
        .areas(chunks[1]);
    render_mbti_card(frame, left, app);
    render_riasec_card(frame, right, app);

    render_recommendations(frame, chunks[2], app);
    render_controls(
        frame,
        chunks[3],
        "1/m MBTI  ·  2/r RIASEC  ·  c refresh  ·  q quit",
    );
}

fn render_mbti_card(frame: &mut Frame, area: Rect, app: &App) {
    let lines = match app.dashboard().mbti() {
        Some(mbti) => {
            let level = Level::for_confidence(mbti.confidence);
            vec![
                Line::from(vec![
                    Span::styled(mbti.mbti.clone(), Style::default().fg(Color::Cyan).bold()),
                    Span::styled(
                        format!("  {}", display_code(&mbti.mbti)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(
                    type_profile(&mbti.mbti)
                        .map_or("", |p| p.title)
                        .fg(Color::White),
                ),
                Line::from(Span::styled(
                    format!("{:.0}% confidence", mbti.confidence),
                    Style::default().fg(level.color()),
                )),
            ]
        }
        None => pending_lines(QuizKind::Mbti, app),
    };

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(panel(" Personality ")),
        area,
    );
}

fn render_riasec_card(frame: &mut Frame, area: Rect, app: &App) {
    let lines = match app.dashboard().riasec() {
        Some(riasec) => {
            let mut lines = vec![Line::from(Span::styled(
                riasec.riasec_code.clone(),
                Style::default().fg(Color::Cyan).bold(),
            ))];
            for axis in app.dashboard().top_interests() {
                lines.push(Line::from(
                    format!(
                        "{} {} {:.0}%",
                        axis_info(axis).icon,
                        axis.name(),
                        riasec.percent(axis)
                    )
                    .fg(Color::White),
                ));
            }
            lines
        }
        None => pending_lines(QuizKind::Riasec, app),
    };

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Interests ")),
        area,
    );
}

/// Card body for a quiz without a cached result.
fn pending_lines(kind: QuizKind, app: &App) -> Vec<Line<'static>> {
    let status = if app.snapshot(kind).question.is_some() {
        "In progress"
    } else {
        "Not taken yet"
    };
    vec![
        Line::from(status.fg(Color::Yellow)),
        Line::from(""),
        Line::from(format!("Take the {kind} assessment to fill this in.").fg(Color::DarkGray)),
    ]
}

fn render_recommendations(frame: &mut Frame, area: Rect, app: &App) {
    let dashboard = app.dashboard();
    let lines: Vec<Line> = match dashboard.recommendations() {
        Recommendations::Idle if !dashboard.can_recommend() => vec![Line::from(
            "Complete both assessments to see your career clusters.".fg(Color::DarkGray),
        )],
        Recommendations::Idle => vec![Line::from("Press c to load recommendations.".fg(Color::DarkGray))],
        Recommendations::Loading => vec![Line::from(
            "Finding your best-fit career clusters...".fg(Color::Yellow),
        )],
        Recommendations::Failed(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        ))],
        Recommendations::Ready(_) if dashboard.top_clusters().is_empty() => {
            vec![Line::from("No matching clusters.".fg(Color::DarkGray))]
        }
        Recommendations::Ready(_) => dashboard
            .top_clusters()
            .iter()
            .enumerate()
            .flat_map(|(rank, cluster)| cluster_lines(rank, cluster))
            .collect(),
    };

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel(" Career Clusters ")),
        area,
    );
}

fn cluster_lines(rank: usize, cluster: &ClusterRecommendation) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{}. {} {}", rank + 1, cluster.icon, cluster.cluster),
                Style::default().fg(Color::White).bold(),
            ),
            Span::styled(
                format!("  {:.0}% match", cluster.match_percent()),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(format!("   {}", cluster.summary()).fg(Color::Gray)),
    ];
    if !cluster.natural_skills.is_empty() {
        lines.push(Line::from(
            format!("   Strengths: {}", cluster.natural_skills.join(", ")).fg(Color::DarkGray),
        ));
    }
    if !cluster.spark_interest.is_empty() {
        lines.push(Line::from(
            format!("   {}", cluster.spark_interest).fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(""));
    lines
}
