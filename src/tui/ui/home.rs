//! Home view: what the screening does and where it sends data.

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::FormField;
use crate::tui::styles::MedicalTheme;
use crate::tui::worker::HealthStatus;

/// Home state for rendering.
#[derive(Debug, Clone)]
pub struct HomeState {
    pub endpoint: String,
    pub timeout: Duration,
    pub health: HealthStatus,
    pub assessments_run: usize,
}

impl HomeState {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            health: HealthStatus::Unknown,
            assessments_run: 0,
        }
    }
}

pub fn render_home(f: &mut Frame, area: Rect, state: &HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_status_panels(f, columns[0], state);
    render_about(f, columns[1]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Cardioscreen", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled("Heart Disease Risk Screening", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn health_line(health: &HealthStatus) -> Line<'static> {
    let (icon, text, style) = match health {
        HealthStatus::Unknown => ("?", "not checked".to_string(), MedicalTheme::text_muted()),
        HealthStatus::Checking => ("…", "checking".to_string(), MedicalTheme::info()),
        HealthStatus::Healthy => ("OK", "reachable".to_string(), MedicalTheme::success()),
        HealthStatus::Unhealthy(reason) => ("FAIL", reason.clone(), MedicalTheme::danger()),
    };

    Line::from(vec![
        Span::styled(format!("  {icon} "), style),
        Span::styled("Service: ", MedicalTheme::text_secondary()),
        Span::styled(text, style),
    ])
}

fn render_status_panels(f: &mut Frame, area: Rect, state: &HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Service status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let status_items = vec![
        health_line(&state.health),
        Line::from(vec![
            Span::styled("  Endpoint: ", MedicalTheme::text_secondary()),
            Span::styled(state.endpoint.clone(), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Timeout: ", MedicalTheme::text_secondary()),
            Span::styled(format!("{}s", state.timeout.as_secs()), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Assessments this session: ", MedicalTheme::text_secondary()),
            Span::styled(state.assessments_run.to_string(), MedicalTheme::text()),
        ]),
    ];

    let status_block = Block::default()
        .title(Span::styled(" Service Status ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(
        Paragraph::new(status_items)
            .block(status_block)
            .wrap(Wrap { trim: true }),
        chunks[0],
    );

    let actions = vec![
        Line::from(vec![
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Assessment", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[H] ", MedicalTheme::key_hint()),
            Span::styled("Check Service", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[1]);
}

fn render_about(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Enter 13 clinical indicators and the remote model estimates whether they \
             suggest an elevated risk of heart disease.",
            MedicalTheme::text(),
        )),
        Line::from(""),
        Line::from(Span::styled("Risk factors assessed:", MedicalTheme::subtitle())),
    ];
    lines.extend(FormField::ALL.iter().map(|field| {
        Line::from(vec![
            Span::styled("  • ", MedicalTheme::text_muted()),
            Span::styled(field.label(), MedicalTheme::text_secondary()),
        ])
    }));

    let block = Block::default()
        .title(Span::styled(" How It Works ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area.inner(ratatui::layout::Margin::new(0, 1)),
    );
}
