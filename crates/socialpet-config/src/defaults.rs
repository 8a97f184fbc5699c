//! Built-in configuration values.
//!
//! # Design
//! - Keep every default in one place so the CLI help text and the loader agree.

/// Origin used when no API URL is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";
/// Per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Upper bound accepted for the per-request timeout.
pub const MAX_TIMEOUT_MS: u64 = 300_000;
/// Log level used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Directory name (under the home directory) holding persisted session state.
pub const STATE_DIR_NAME: &str = ".socialpet";
