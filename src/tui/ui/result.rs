//! Result view: pending request, risk assessment, or error.

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Assessment, FormField, FormValues, RiskLevel, MEDICAL_DISCLAIMER};
use crate::tui::styles::MedicalTheme;

/// Key inputs echoed next to the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSummary {
    pub rows: Vec<(&'static str, String)>,
}

impl InputSummary {
    #[must_use]
    pub fn from_form(form: &FormValues) -> Self {
        let sex = match form.value_or_empty(FormField::Sex) {
            "male" => "Male",
            "female" => "Female",
            _ => "-",
        };
        let with_unit = |field: FormField, unit: &str| {
            let value = form.value_or_empty(field);
            if value.is_empty() {
                "-".to_string()
            } else {
                format!("{}{unit}", value.trim())
            }
        };

        Self {
            rows: vec![
                ("Age", with_unit(FormField::Age, " years")),
                ("Sex", sex.to_string()),
                ("Blood Pressure", with_unit(FormField::RestingBloodPressure, " mmHg")),
                ("Cholesterol", with_unit(FormField::SerumCholesterol, " mg/dl")),
                ("Max Heart Rate", with_unit(FormField::MaxHeartRate, " bpm")),
                ("ST Depression", with_unit(FormField::StDepression, "")),
            ],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum ResultState {
    #[default]
    Idle,
    /// Request in flight
    Pending { elapsed: Duration, timeout: Duration },
    Complete {
        assessment: Assessment,
        summary: Option<InputSummary>,
    },
    Error { message: String, timed_out: bool },
}

pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Idle => render_idle(f, chunks[1]),
        ResultState::Pending { elapsed, timeout } => {
            render_pending(f, chunks[1], *elapsed, *timeout)
        }
        ResultState::Complete {
            assessment,
            summary,
        } => render_assessment(f, chunks[1], assessment, summary.as_ref()),
        ResultState::Error { message, timed_out } => {
            render_error(f, chunks[1], message, *timed_out)
        }
    }
    render_result_footer(f, chunks[2], state);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Risk Assessment", MedicalTheme::title()),
        Span::styled(" │ Remote model", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No assessment yet",
            MedicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Fill in the screening form to begin",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

/// Share of the deadline used so far, in `[0, 1]`.
fn deadline_ratio(elapsed: Duration, timeout: Duration) -> f64 {
    if timeout.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / timeout.as_secs_f64()).clamp(0.0, 1.0)
}

fn render_pending(f: &mut Frame, area: Rect, elapsed: Duration, timeout: Duration) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .margin(2)
        .split(area);

    let stage_text = Paragraph::new(Line::from(vec![Span::styled(
        "Analyzing...",
        MedicalTheme::focused(),
    )]))
    .alignment(Alignment::Center);
    f.render_widget(stage_text, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Waiting for service ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::info())
        .ratio(deadline_ratio(elapsed, timeout))
        .label(format!(
            "{}s / {}s",
            elapsed.as_secs(),
            timeout.as_secs()
        ));
    f.render_widget(gauge, chunks[1]);

    let desc = Paragraph::new(Line::from(Span::styled(
        "The service may take a moment to wake up on first use.",
        MedicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(desc, chunks[2]);
}

fn risk_heading(level: RiskLevel) -> String {
    format!("Risk Assessment: {level} RISK")
}

fn assessed_at(assessment: &Assessment) -> String {
    let local = assessment.created_at.with_timezone(&chrono::Local);
    format!("Assessed {}", local.format("%Y-%m-%d %H:%M:%S"))
}

fn render_assessment(
    f: &mut Frame,
    area: Rect,
    assessment: &Assessment,
    summary: Option<&InputSummary>,
) {
    let block = Block::default()
        .title(Span::styled(" Assessment Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let summary_height = summary.map_or(0, |s| s.rows.len() as u16 + 2);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),              // Risk level + description
            Constraint::Length(4),              // Confidence
            Constraint::Length(summary_height), // Inputs
            Constraint::Min(0),                 // Disclaimer
        ])
        .margin(1)
        .split(inner);

    let risk_style = MedicalTheme::risk_level(assessment.risk_level);
    let icon = if assessment.is_elevated() { "!" } else { "OK" };

    let risk_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{icon} {}", risk_heading(assessment.risk_level)),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(assessed_at(assessment), MedicalTheme::text_muted())),
        Line::from(""),
        Line::from(Span::styled(
            assessment.risk_level.description(),
            MedicalTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(risk_display, chunks[0]);

    if let (Some(confidence), Some(label)) =
        (assessment.confidence, assessment.confidence_display())
    {
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .title(Span::styled(" Model Confidence ", MedicalTheme::text_secondary()))
                    .borders(Borders::ALL)
                    .border_style(MedicalTheme::border()),
            )
            .gauge_style(risk_style)
            .ratio(confidence.clamp(0.0, 1.0))
            .label(format!("Model Confidence: {label}"));
        f.render_widget(gauge, chunks[1]);
    }

    if let Some(summary) = summary {
        let lines: Vec<Line> = summary
            .rows
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("  {label}: "), MedicalTheme::text_secondary()),
                    Span::styled(value.clone(), MedicalTheme::text()),
                ])
            })
            .collect();
        let inputs = Paragraph::new(lines).block(
            Block::default()
                .title(Span::styled(" Your Inputs ", MedicalTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );
        f.render_widget(inputs, chunks[2]);
    }

    let disclaimer = Paragraph::new(vec![
        Line::from(Span::styled("Medical Disclaimer", MedicalTheme::warning())),
        Line::from(Span::styled(MEDICAL_DISCLAIMER, MedicalTheme::text_muted())),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(disclaimer, chunks[3]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str, timed_out: bool) {
    let title = if timed_out { "! Request timed out" } else { "! Error" };
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(title, MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "Your answers are kept. Press Enter to review and resubmit.",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect, state: &ResultState) {
    let content = match state {
        ResultState::Complete { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Home ", MedicalTheme::key_desc()),
            Span::styled("[N] ", MedicalTheme::key_hint()),
            Span::styled("New Assessment", MedicalTheme::key_desc()),
        ]),
        ResultState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Back to Form ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Home", MedicalTheme::key_desc()),
        ]),
        _ => Line::from(vec![Span::styled(
            "Processing...",
            MedicalTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
