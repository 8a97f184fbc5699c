//! Telemetry primitives shared across the SocialPet workspace.
//!
//! This crate centralises logging setup so the client library and the
//! terminal front end emit the same structured events.

pub mod error;
pub mod init;

pub use error::{Result, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_setting,
};
