use socialpet_api_models::LostPet;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::RequestOptions;
use crate::services::{resolve_media_url, segment};

/// Lost-pet reports.
#[derive(Clone, Debug)]
pub struct LostPetService {
    client: ApiClient,
}

impl LostPetService {
    /// Wrap `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All open reports.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn list(&self) -> Result<Vec<LostPet>, ApiError> {
        let reports: Vec<LostPet> = self.client.get_json("/api/lostpets").await?;
        let base = self.client.base_url();
        Ok(reports
            .into_iter()
            .map(|mut report| {
                report.image_url = resolve_media_url(&base, report.image_url.take());
                report
            })
            .collect())
    }

    /// Report detail.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    pub async fn get(&self, id: &str) -> Result<LostPet, ApiError> {
        let mut report: LostPet = self
            .client
            .get_json(&format!("/api/lostpets/{}", segment(id)?))
            .await?;
        report.image_url = resolve_media_url(&self.client.base_url(), report.image_url.take());
        Ok(report)
    }

    /// File a report on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn create(&self, user_id: &str, report: &LostPet) -> Result<LostPet, ApiError> {
        let path = format!("/api/lostpets/{}", segment(user_id)?);
        self.client.post_json(&path, report).await
    }

    /// Replace a report.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn update(&self, id: &str, report: &LostPet) -> Result<LostPet, ApiError> {
        let path = format!("/api/lostpets/{}", segment(id)?);
        self.client.put_json(&path, report).await
    }

    /// Withdraw a report owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`]; the backend answers 403 when the
    /// report belongs to someone else.
    pub async fn delete(&self, id: &str, user_id: &str) -> Result<(), ApiError> {
        let path = format!("/api/lostpets/{}", segment(id)?);
        let options = RequestOptions::new().query("userId", segment(user_id)?);
        self.client.delete(&path, options).await
    }
}
