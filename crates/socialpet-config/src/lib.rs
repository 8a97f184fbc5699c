#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs)]

//! Typed configuration for the SocialPet API client.
//!
//! Layout: `defaults.rs` (built-in values), `model.rs` (typed config models),
//! `validate.rs` (parsing/validation helpers), `loader.rs` (environment
//! loading), `error.rs` (`ConfigError`).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ENV_API_URL, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_REFRESH_PATH, ENV_STATE_DIR, ENV_TIMEOUT_MS,
};
pub use model::{ClientConfig, RefreshPolicy, TelemetrySettings};
