//! Screening form: 13 clinical fields with inline validation.

use std::collections::BTreeMap;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    validate_field, validate_form, FieldKind, FormField, FormProgress, FormValues,
    ValidationRules,
};
use crate::tui::styles::MedicalTheme;

/// Form state
pub struct ScreeningFormState {
    values: FormValues,
    rules: ValidationRules,
    pub selected: usize,
    /// Inline error per field
    pub errors: BTreeMap<FormField, String>,
    /// Form-level banner, e.g. after a rejected submit
    pub banner: Option<String>,
}

impl ScreeningFormState {
    #[must_use]
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            values: FormValues::new(),
            rules,
            selected: 0,
            errors: BTreeMap::new(),
            banner: None,
        }
    }

    #[must_use]
    pub fn selected_field(&self) -> FormField {
        FormField::ALL[self.selected]
    }

    #[must_use]
    pub fn values(&self) -> &FormValues {
        &self.values
    }

    #[must_use]
    pub fn progress(&self) -> FormProgress {
        FormProgress::of(&self.values, &self.rules)
    }

    /// Move to the next field, validating the one being left.
    pub fn next_field(&mut self) {
        self.validate_selected();
        self.selected = (self.selected + 1) % FormField::ALL.len();
        self.errors.remove(&self.selected_field());
    }

    /// Move to the previous field, validating the one being left.
    pub fn prev_field(&mut self) {
        self.validate_selected();
        if self.selected == 0 {
            self.selected = FormField::ALL.len() - 1;
        } else {
            self.selected -= 1;
        }
        self.errors.remove(&self.selected_field());
    }

    /// Type a character into a numeric field. Choice fields ignore typing.
    pub fn input_char(&mut self, c: char) {
        let field = self.selected_field();
        let accepted = match field.kind() {
            FieldKind::Integer => c.is_ascii_digit() || c == '-',
            FieldKind::Decimal => c.is_ascii_digit() || c == '.' || c == '-',
            FieldKind::Choice(_) => false,
        };
        if !accepted {
            return;
        }

        let mut value = self.values.value_or_empty(field).to_string();
        value.push(c);
        self.values.set(field, value);
        self.banner = None;
        self.validate_selected();
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        let field = self.selected_field();
        if field.options().is_some() {
            return;
        }
        let mut value = self.values.value_or_empty(field).to_string();
        value.pop();
        self.values.set(field, value);
        if self.values.value_or_empty(field).is_empty() {
            self.errors.remove(&field);
        } else {
            self.validate_selected();
        }
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        let field = self.selected_field();
        self.values.set(field, "");
        self.errors.remove(&field);
    }

    /// Step through a choice field's options.
    pub fn cycle_option(&mut self, forward: bool) {
        let field = self.selected_field();
        let Some(options) = field.options() else {
            return;
        };
        let current = options
            .iter()
            .position(|o| *o == self.values.value_or_empty(field));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => options.len() - 1,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
        };
        self.values.set(field, options[next]);
        self.banner = None;
        self.validate_selected();
    }

    fn validate_selected(&mut self) {
        let field = self.selected_field();
        match validate_field(field, self.values.value_or_empty(field), &self.rules) {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(e) => {
                self.errors.insert(field, e.to_string());
            }
        }
    }

    /// Validate every field, focusing the first invalid one.
    ///
    /// Returns whether the form may be submitted.
    pub fn validate_all(&mut self) -> bool {
        self.errors.clear();
        match validate_form(&self.values, &self.rules) {
            Ok(()) => {
                self.banner = None;
                true
            }
            Err(issues) => {
                if let Some(first) = issues.first() {
                    self.selected = FormField::ALL
                        .iter()
                        .position(|f| *f == first.field)
                        .unwrap_or(0);
                }
                for issue in issues {
                    self.errors.insert(issue.field, issue.error.to_string());
                }
                self.banner = Some(
                    "Please fill in all required fields correctly. Check the highlighted fields above."
                        .to_string(),
                );
                false
            }
        }
    }

    pub fn load_sample_data(&mut self) {
        self.values = FormValues::sample();
        self.errors.clear();
        self.banner = None;
    }

    /// Wipe all values and field states.
    pub fn reset(&mut self) {
        self.values.zeroize();
        self.errors.clear();
        self.banner = None;
        self.selected = 0;
    }
}

/// Render the screening form
pub fn render_screening_form(f: &mut Frame, area: Rect, state: &ScreeningFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_progress(f, chunks[1], state.progress());
    render_form_fields(f, chunks[2], state);
    render_form_footer(f, chunks[3], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Heart Disease Risk Assessment", MedicalTheme::title()),
        Span::styled(" │ 13 clinical indicators", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_progress(f: &mut Frame, area: Rect, progress: FormProgress) {
    let gauge = Gauge::default()
        .gauge_style(MedicalTheme::progress(progress.ratio()))
        .ratio(progress.ratio().clamp(0.0, 1.0))
        .label(progress.to_string());
    f.render_widget(gauge, area.inner(ratatui::layout::Margin::new(1, 1)));
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &ScreeningFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (FormField::ALL.len() + 1) / 2;
    render_field_column(f, columns[0], &FormField::ALL[..mid], 0, state);
    render_field_column(f, columns[1], &FormField::ALL[mid..], mid, state);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    state: &ScreeningFormState,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == state.selected;
        let error = state.errors.get(field);

        let border_style = match (error.is_some(), is_selected) {
            (true, _) => MedicalTheme::danger(),
            (false, true) => MedicalTheme::border_focused(),
            (false, false) => MedicalTheme::border(),
        };
        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let mut block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);
        if let Some(message) = error {
            block = block.title_bottom(Span::styled(format!(" {message} "), MedicalTheme::danger()));
        }

        let value = state.values.value_or_empty(*field);
        let value_display = if value.is_empty() {
            Span::styled(field.hint(), MedicalTheme::text_muted())
        } else if field.options().is_some() {
            Span::styled(format!("‹ {value} ›"), MedicalTheme::text())
        } else {
            Span::styled(value.to_string(), MedicalTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected && field.options().is_none() {
                Span::styled("▌", MedicalTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &ScreeningFormState) {
    let content = if let Some(banner) = &state.banner {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::warning()),
            Span::styled(banner.clone(), MedicalTheme::warning()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Choose ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Analyze Risk ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Reset ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Back", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
