use socialpet_api_models::UserAccount;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::services::segment;

/// Account lookups.
#[derive(Clone, Debug)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    /// Wrap `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Public profile of one account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    pub async fn get(&self, id: &str) -> Result<UserAccount, ApiError> {
        let path = format!("/api/v1/users/{}", segment(id)?);
        self.client.get_json(&path).await
    }

    /// Every account. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthorizationDenied`] for non-admin sessions.
    pub async fn list_all(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.client.get_json("/api/v1/admin/users").await
    }
}
