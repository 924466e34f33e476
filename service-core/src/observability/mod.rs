//! Observability module for logging setup.
//!
//! Provides consistent tracing initialization across services.

pub mod logging;
