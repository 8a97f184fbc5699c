use socialpet_api_models::{AdoptionListing, AdoptionListingRequest, ListingId};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::RequestOptions;
use crate::services::{resolve_media_url, segment};

/// Adoption listings.
#[derive(Clone, Debug)]
pub struct AdoptionService {
    client: ApiClient,
}

impl AdoptionService {
    /// Wrap `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Most recent public listings.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn recent(&self) -> Result<Vec<AdoptionListing>, ApiError> {
        let listings: Vec<AdoptionListing> =
            self.client.get_json("/api/v1/adoption/recent").await?;
        debug!(count = listings.len(), "adoption listings loaded");
        Ok(listings
            .into_iter()
            .map(|listing| self.with_absolute_image(listing))
            .collect())
    }

    /// Listing detail by slug.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown slugs.
    pub async fn by_slug(&self, slug: &str) -> Result<AdoptionListing, ApiError> {
        let path = format!("/api/v1/adoption/{}", segment(slug)?);
        let listing = self.client.get_json(&path).await?;
        Ok(self.with_absolute_image(listing))
    }

    /// Publish a new listing.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn create(
        &self,
        request: &AdoptionListingRequest,
    ) -> Result<AdoptionListing, ApiError> {
        let listing = self
            .client
            .post_json("/api/v1/adoption/create", request)
            .await?;
        Ok(self.with_absolute_image(listing))
    }

    /// Replace an existing listing.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn update(
        &self,
        id: &ListingId,
        request: &AdoptionListingRequest,
    ) -> Result<AdoptionListing, ApiError> {
        let path = format!("/api/v1/adoption/{}", segment(&id.to_string())?);
        let listing = self.client.put_json(&path, request).await?;
        Ok(self.with_absolute_image(listing))
    }

    /// Remove a listing.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn delete(&self, id: &ListingId) -> Result<(), ApiError> {
        let path = format!("/api/v1/adoption/{}", segment(&id.to_string())?);
        self.client.delete(&path, RequestOptions::new()).await
    }

    fn with_absolute_image(&self, mut listing: AdoptionListing) -> AdoptionListing {
        listing.image_url = resolve_media_url(&self.client.base_url(), listing.image_url.take());
        listing
    }
}
