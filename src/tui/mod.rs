//! Terminal UI: screening form, result view and the event loop.

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::MedicalTheme;
pub use worker::{HealthHandle, HealthStatus, SubmissionHandle, SubmissionOutcome, SubmissionWorker};
