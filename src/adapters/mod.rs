//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the remote inference service
//! - `sanitize`: redaction of clinical values and secrets in logs

pub mod http;
pub mod sanitize;

pub use http::HttpPredictor;
