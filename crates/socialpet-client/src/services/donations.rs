use socialpet_api_models::DonationOrganization;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::services::resolve_media_url;

/// Organizations accepting donations.
#[derive(Clone, Debug)]
pub struct DonationService {
    client: ApiClient,
}

impl DonationService {
    /// Wrap `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Publicly listed organizations.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn active(&self) -> Result<Vec<DonationOrganization>, ApiError> {
        let organizations: Vec<DonationOrganization> = self
            .client
            .get_json("/api/v1/donation-organizations")
            .await?;
        let base = self.client.base_url();
        Ok(organizations
            .into_iter()
            .filter(|organization| organization.active)
            .map(|mut organization| {
                organization.image_url = resolve_media_url(&base, organization.image_url.take());
                organization
            })
            .collect())
    }

    /// Organization detail.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    pub async fn get(&self, id: i64) -> Result<DonationOrganization, ApiError> {
        let mut organization: DonationOrganization = self
            .client
            .get_json(&format!("/api/v1/donation-organizations/{id}"))
            .await?;
        organization.image_url =
            resolve_media_url(&self.client.base_url(), organization.image_url.take());
        Ok(organization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::test_support::client_for;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn active_skips_inactive_organizations() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/donation-organizations");
            then.status(200).json_body(json!([
                { "id": 1, "name": "Paws", "active": true, "imageUrl": "/logos/paws.png" },
                { "id": 2, "name": "Closed shelter", "active": false }
            ]));
        });

        let organizations = DonationService::new(client_for(&server)?).active().await?;
        assert_eq!(organizations.len(), 1);
        assert_eq!(organizations[0].name, "Paws");
        assert!(
            organizations[0]
                .image_url
                .as_deref()
                .is_some_and(|url| url.ends_with("/logos/paws.png"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn get_maps_missing_organization() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/donation-organizations/42");
            then.status(404);
        });

        let err = DonationService::new(client_for(&server)?).get(42).await.err();
        assert_eq!(err.map(|err| err.kind()), Some(ErrorKind::NotFound));
        Ok(())
    }
}
