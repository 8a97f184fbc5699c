//! Context wiring, session persistence, and error mapping for the CLI.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use socialpet_client::{
    ApiClient, ApiError, AuthError, ErrorKind, FileStore, KeyValueStore, LoginNavigator, Session,
    SessionError,
};
use socialpet_config::defaults::STATE_DIR_NAME;
use socialpet_config::validate::{parse_base_url, validate_timeout};
use socialpet_config::{ClientConfig, ConfigError};

use crate::cli::{Cli, OutputFormat};

/// File inside the state directory holding the persisted session.
pub(crate) const SESSION_FILE: &str = "session.json";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        let message = err.user_message();
        match err.kind() {
            ErrorKind::ClientValidation
            | ErrorKind::NotFound
            | ErrorKind::AuthorizationDenied
            | ErrorKind::InvalidRequest => Self::Validation(message),
            ErrorKind::NetworkUnavailable
            | ErrorKind::AuthenticationExpired
            | ErrorKind::ServerError
            | ErrorKind::MalformedResponse => {
                let status = err
                    .status()
                    .map_or_else(String::new, |status| format!(" (status {status})"));
                Self::Failure(anyhow::Error::new(err).context(format!("{message}{status}")))
            }
        }
    }
}

impl From<AuthError> for CliError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Api { source } => source.into(),
            AuthError::Session { source } => source.into(),
        }
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        if matches!(
            err,
            SessionError::EmptyToken | SessionError::NotAuthenticated
        ) {
            return Self::Validation(err.to_string());
        }
        Self::Failure(anyhow::Error::new(err).context("failed to save session"))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Validation(err.describe())
    }
}

/// Prints the re-login notice when the backend ends the session.
#[derive(Debug, Default)]
pub(crate) struct TerminalNavigator;

impl LoginNavigator for TerminalNavigator {
    fn navigate_to_login(&self) {
        eprintln!("Your session has expired. Run `socialpet login` to sign in again.");
    }
}

/// Application context passed to command handlers.
#[derive(Clone, Debug)]
pub(crate) struct AppContext {
    pub(crate) client: ApiClient,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Build the client and session described by the flags, layered over
    /// the environment configuration.
    pub(crate) fn from_cli(cli: &Cli) -> CliResult<Self> {
        let config = resolve_config(cli)?;
        let state_dir = config
            .state_dir
            .clone()
            .or_else(default_state_dir)
            .ok_or_else(|| {
                CliError::validation("cannot locate a home directory; pass --state-dir")
            })?;
        let store = open_store(&state_dir)?;
        Self::with_store(&config, store, cli.output)
    }

    pub(crate) fn with_store(
        config: &ClientConfig,
        store: Arc<dyn KeyValueStore>,
        output: OutputFormat,
    ) -> CliResult<Self> {
        let session = Arc::new(Session::restore(store));
        let client = ApiClient::new(config, session)
            .map_err(|err| CliError::failure(anyhow::Error::new(err)))?;
        client.navigation().attach(Arc::new(TerminalNavigator));
        Ok(Self { client, output })
    }
}

fn resolve_config(cli: &Cli) -> CliResult<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.base_url = parse_base_url(url)?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout = validate_timeout(Duration::from_millis(timeout_ms))?;
    }
    if let Some(dir) = &cli.state_dir {
        config.state_dir = Some(dir.clone());
    }
    config.validate()?;
    Ok(config)
}

fn default_state_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(STATE_DIR_NAME))
}

pub(crate) fn open_store(state_dir: &Path) -> CliResult<Arc<dyn KeyValueStore>> {
    let path = state_dir.join(SESSION_FILE);
    let store = FileStore::open(&path).map_err(|err| {
        CliError::failure(
            anyhow::Error::new(err).context(format!("failed to open {}", path.display())),
        )
    })?;
    Ok(Arc::new(store))
}

/// Wrap a formatting failure.
pub(crate) fn format_failure(err: &serde_json::Error) -> CliError {
    CliError::failure(anyhow!("failed to format JSON: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use socialpet_client::NetworkFailure;

    #[test]
    fn client_side_errors_are_validation() {
        let err = CliError::from(ApiError::NotFound {
            message: Some("Listing not found".into()),
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "Listing not found");
    }

    #[test]
    fn operational_errors_are_failures_with_status() {
        let err = CliError::from(ApiError::ServerError {
            status: 503,
            message: None,
        });
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("status 503"));

        let offline = CliError::from(ApiError::NetworkUnavailable {
            failure: NetworkFailure::Connect,
            detail: "connection refused".into(),
        });
        assert_eq!(offline.exit_code(), 3);
        assert!(offline.display_message().contains("Could not reach the server"));
    }

    #[test]
    fn session_store_lives_in_state_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = open_store(dir.path())?;
        store
            .set("token", "tok-A")
            .map_err(|err| anyhow!("store write failed: {err}"))?;
        assert!(dir.path().join(SESSION_FILE).is_file());
        Ok(())
    }

    #[test]
    fn config_errors_are_validation() -> Result<()> {
        let Some(err) = parse_base_url("ftp://pets").err() else {
            return Err(anyhow!("ftp URL should be rejected"));
        };
        let err = CliError::from(err);
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("api_url"));
        Ok(())
    }
}
