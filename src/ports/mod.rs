//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the screening use case and the remote inference service.

mod predictor;

pub use predictor::{ApiError, Predictor};
