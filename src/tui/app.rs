//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Submissions via the background worker

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::runtime::Runtime;

use crate::adapters::HttpPredictor;
use crate::application::ScreeningService;
use crate::config::AppConfig;

use super::ui::{
    form::{render_screening_form, ScreeningFormState},
    home::{render_home, HomeState},
    render_disclaimer,
    result::{render_result, InputSummary, ResultState},
};
use super::worker::{
    HealthHandle, HealthStatus, SubmissionHandle, SubmissionOutcome, SubmissionWorker,
};

/// Current screen/view in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Home,
    Form,
    Result,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,

    /// Runtime for the network calls; the event loop itself stays synchronous
    runtime: Runtime,
    service: Arc<ScreeningService<HttpPredictor>>,
    config: AppConfig,

    home_state: HomeState,
    form_state: ScreeningFormState,
    result_state: ResultState,

    pending: Option<SubmissionHandle>,
    pending_health: Option<HealthHandle>,
}

impl App {
    /// Create the application with the HTTP predictor described by `config`.
    ///
    /// # Errors
    /// Returns error if the async runtime cannot be started.
    pub fn new(config: AppConfig) -> Result<Self> {
        let predictor = Arc::new(HttpPredictor::from_config(&config));
        let service = Arc::new(ScreeningService::new(predictor, config.validation.clone()));
        Self::with_service(config, service)
    }

    /// Create application with an injected service (Composition Root pattern).
    ///
    /// # Errors
    /// Returns error if the async runtime cannot be started.
    pub fn with_service(
        config: AppConfig,
        service: Arc<ScreeningService<HttpPredictor>>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("cardioscreen-net")
            .enable_all()
            .build()?;

        Ok(Self {
            screen: Screen::Home,
            should_quit: false,
            runtime,
            home_state: HomeState::new(service.endpoint(), config.request_timeout),
            form_state: ScreeningFormState::new(service.rules().clone()),
            result_state: ResultState::default(),
            service,
            config,
            pending: None,
            pending_health: None,
        })
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.start_health_check();

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        self.form_state.reset();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_submission();
            self.poll_health();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                match self.screen {
                    Screen::Home => render_home(f, chunks[0], &self.home_state),
                    Screen::Form => render_screening_form(f, chunks[0], &self.form_state),
                    Screen::Result => render_result(f, chunks[0], &self.result_state),
                }

                render_disclaimer(f, chunks[1]);
            })?;

            // Short poll to keep the elapsed counter ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn poll_submission(&mut self) {
        let Some(handle) = self.pending.as_ref() else {
            return;
        };

        match handle.try_recv() {
            Some(SubmissionOutcome::Complete(assessment)) => {
                let summary = self
                    .config
                    .show_input_summary
                    .then(|| InputSummary::from_form(self.form_state.values()));
                self.result_state = ResultState::Complete {
                    assessment,
                    summary,
                };
                self.home_state.assessments_run += 1;
                // The answers are no longer needed once the result is shown.
                self.form_state.reset();
                self.pending = None;
            }
            Some(SubmissionOutcome::Failed { message, timed_out }) => {
                self.result_state = ResultState::Error { message, timed_out };
                self.pending = None;
            }
            None => {
                self.result_state = ResultState::Pending {
                    elapsed: handle.elapsed(),
                    timeout: self.config.request_timeout,
                };
            }
        }
    }

    fn poll_health(&mut self) {
        let Some(handle) = self.pending_health.as_ref() else {
            return;
        };
        if let Some(status) = handle.try_recv() {
            self.home_state.health = status;
            self.pending_health = None;
        }
    }

    fn start_health_check(&mut self) {
        if self.pending_health.is_some() {
            return;
        }
        self.home_state.health = HealthStatus::Checking;
        self.pending_health = Some(SubmissionWorker::check_health(
            self.runtime.handle(),
            self.service.clone(),
        ));
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Form => self.handle_form_key(key),
            Screen::Result => self.handle_result_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.form_state.reset();
                self.screen = Screen::Form;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => self.start_health_check(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.cycle_option(false),
            KeyCode::Right | KeyCode::Char(' ') => self.form_state.cycle_option(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.form_state.load_sample_data(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.form_state.reset(),
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn handle_result_key(&mut self, key: KeyCode) {
        match &self.result_state {
            ResultState::Complete { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => self.screen = Screen::Home,
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.form_state.reset();
                    self.screen = Screen::Form;
                }
                _ => {}
            },
            ResultState::Error { .. } => match key {
                // Back to the form with the answers intact.
                KeyCode::Enter => self.screen = Screen::Form,
                KeyCode::Esc => self.screen = Screen::Home,
                _ => {}
            },
            ResultState::Idle | ResultState::Pending { .. } => {}
        }
    }

    fn submit_form(&mut self) {
        if self.pending.is_some() || self.service.is_submitting() {
            tracing::debug!("Ignoring submit while a prediction is pending");
            return;
        }
        if !self.form_state.validate_all() {
            return;
        }

        self.screen = Screen::Result;
        self.result_state = ResultState::Pending {
            elapsed: Duration::ZERO,
            timeout: self.config.request_timeout,
        };
        self.pending = Some(SubmissionWorker::spawn(
            self.runtime.handle(),
            self.service.clone(),
            self.form_state.values().clone(),
        ));
    }
}
