//! Shared utilities for the xchain bridge tooling.

pub mod logging;

pub use logging::{init_logging, LogFormat};
