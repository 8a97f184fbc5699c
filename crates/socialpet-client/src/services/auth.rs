use socialpet_api_models::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest,
    UserAccount,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::{Method, RequestOptions};
use crate::services::segment;
use crate::session::{SessionError, UserProfile};

/// Failure of a flow that talks to the backend and then updates the session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend call failed.
    #[error("authentication request failed")]
    Api {
        /// Classified API error.
        #[from]
        source: ApiError,
    },
    /// The session could not be updated.
    #[error("failed to update session")]
    Session {
        /// Source session error.
        #[from]
        source: SessionError,
    },
}

impl AuthError {
    /// Text suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { source } => source.user_message(),
            Self::Session { .. } => "Could not save your session on this device.".to_string(),
        }
    }
}

/// Account endpoints: sign-in, sign-up, password recovery.
#[derive(Clone, Debug)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    /// Wrap `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and establish the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Api`] when the credentials are rejected or the
    /// backend is unreachable, and [`AuthError::Session`] when the token
    /// could not be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::invalid("email and password are required").into());
        }
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self.client.post_json("/api/auth/login", &payload).await?;
        let profile = UserProfile::from(&response.user);
        self.client.establish(response.access_token, profile.clone())?;
        info!(user_id = %profile.id, "signed in");
        Ok(profile)
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`]; validation problems surface as
    /// [`ApiError::ClientValidation`] with the server's message.
    pub async fn register(&self, payload: &RegisterRequest) -> Result<(), ApiError> {
        if payload.password != payload.confirm_password {
            return Err(ApiError::invalid("passwords do not match"));
        }
        let options = RequestOptions::new().json(payload)?;
        self.client
            .request(Method::Post, "/api/auth/register", options)
            .await
            .map(drop)
    }

    /// Notify the backend (best effort) and clear the local session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] only when the persisted token could not
    /// be removed; the in-memory session is cleared regardless.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if self.client.session().is_authenticated() {
            if let Err(err) = self
                .client
                .request(Method::Post, "/auth/logout", RequestOptions::new())
                .await
            {
                warn!(error = %err, "logout notification failed; clearing session anyway");
            }
        }
        self.client.clear_token()
    }

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let payload = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        let options = RequestOptions::new().json(&payload)?;
        self.client
            .request(Method::Post, "/auth/forgot-password", options)
            .await
            .map(drop)
    }

    /// Set a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let payload = ResetPasswordRequest {
            token: token.trim().to_string(),
            password: password.to_string(),
        };
        let options = RequestOptions::new().json(&payload)?;
        self.client
            .request(Method::Post, "/auth/reset-password", options)
            .await
            .map(drop)
    }

    /// Confirm an email address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a token that cannot be placed
    /// in a path, otherwise the classified [`ApiError`].
    pub async fn verify_email(&self, token: &str) -> Result<(), ApiError> {
        let path = format!("/auth/verify-email/{}", segment(token)?);
        self.client
            .request(Method::Post, &path, RequestOptions::new())
            .await
            .map(drop)
    }

    /// Fetch the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn current_user(&self) -> Result<UserAccount, ApiError> {
        self.client.get_json("/api/v1/users/me").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::test_support::client_for;
    use crate::session::SessionState;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;

    fn auth_body() -> serde_json::Value {
        json!({
            "accessToken": "tok-A",
            "user": {
                "userId": "u-1",
                "email": "ada@example.com",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "username": "ada",
                "role": "USER"
            }
        })
    }

    #[tokio::test]
    async fn login_establishes_session() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/login")
                .json_body(json!({ "email": "ada@example.com", "password": "hunter2" }));
            then.status(200).json_body(auth_body());
        });

        let client = client_for(&server)?;
        let auth = AuthService::new(client.clone());
        let profile = auth.login(" ada@example.com ", "hunter2").await?;

        mock.assert();
        assert_eq!(profile.display_name, "Ada Lovelace");
        assert_eq!(client.session().token().as_deref(), Some("tok-A"));
        assert_eq!(client.session().user(), Some(profile));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_stays_anonymous() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(401)
                .json_body(json!({ "message": "Invalid email or password" }));
        });

        let client = client_for(&server)?;
        let err = AuthService::new(client.clone())
            .login("ada@example.com", "wrong")
            .await
            .err();
        let Some(AuthError::Api { source }) = err else {
            return Err(anyhow::anyhow!("expected the login to be rejected by the backend"));
        };
        assert_eq!(source.kind(), ErrorKind::ClientValidation);
        assert_eq!(source.user_message(), "Invalid email or password");
        assert!(source.should_display());
        assert_eq!(client.session().state(), SessionState::Anonymous);
        assert!(!client.navigation().has_pending());
        Ok(())
    }

    #[tokio::test]
    async fn login_drops_redirect_queued_by_earlier_expiry() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/users/me")
                .header("authorization", "Bearer tok-old");
            then.status(401);
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200).json_body(auth_body());
        });

        let client = client_for(&server)?;
        client.attach_token("tok-old")?;
        assert!(AuthService::new(client.clone()).current_user().await.is_err());
        assert!(client.navigation().has_pending());

        AuthService::new(client.clone())
            .login("ada@example.com", "hunter2")
            .await?;
        assert!(!client.navigation().has_pending());
        assert_eq!(client.session().state(), SessionState::Authenticated);
        Ok(())
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected_locally() -> Result<()> {
        let server = MockServer::start_async().await;
        let client = client_for(&server)?;
        let err = AuthService::new(client).login("  ", "x").await.err();
        assert!(matches!(
            err,
            Some(AuthError::Api { source }) if source.kind() == ErrorKind::InvalidRequest
        ));
        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_session_even_when_server_fails() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/logout")
                .header("authorization", "Bearer tok-A");
            then.status(500);
        });

        let client = client_for(&server)?;
        client.attach_token("tok-A")?;
        AuthService::new(client.clone()).logout().await?;
        mock.assert();
        assert_eq!(client.session().state(), SessionState::Anonymous);
        Ok(())
    }

    #[tokio::test]
    async fn logout_when_anonymous_skips_server() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/auth/logout");
            then.status(200);
        });

        let client = client_for(&server)?;
        AuthService::new(client).logout().await?;
        assert_eq!(mock.hits(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn register_surfaces_validation_message() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/register").json_body(json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "userName": "ada",
                "email": "ada@example.com",
                "phoneNumber": "5550000",
                "password": "hunter2",
                "confirmPassword": "hunter2"
            }));
            then.status(409)
                .json_body(json!({ "message": "Email already in use" }));
        });

        let client = client_for(&server)?;
        let payload = RegisterRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            user_name: "ada".into(),
            email: "ada@example.com".into(),
            phone_number: "5550000".into(),
            password: "hunter2".into(),
            confirm_password: "hunter2".into(),
        };
        let err = AuthService::new(client.clone())
            .register(&payload)
            .await
            .err();
        assert_eq!(
            err.as_ref().map(ApiError::user_message).as_deref(),
            Some("Email already in use")
        );
        assert!(!client.session().is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn verify_email_puts_token_in_path() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/auth/verify-email/abc123");
            then.status(200);
        });

        let client = client_for(&server)?;
        let auth = AuthService::new(client);
        auth.verify_email("abc123").await?;
        mock.assert();
        assert!(auth.verify_email("../admin").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn current_user_decodes_account() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/users/me")
                .header("authorization", "Bearer tok-A");
            then.status(200).json_body(json!({
                "id": "u-1",
                "username": "ada",
                "email": "ada@example.com",
                "role": "USER"
            }));
        });

        let client = client_for(&server)?;
        client.attach_token("tok-A")?;
        let account = AuthService::new(client).current_user().await?;
        assert_eq!(account.username, "ada");
        assert_eq!(account.role.as_deref(), Some("USER"));
        Ok(())
    }
}
