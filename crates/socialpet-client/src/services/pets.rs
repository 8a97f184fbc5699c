use socialpet_api_models::{AnimalType, Breed, Pet};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::request::RequestOptions;
use crate::services::{resolve_media_url, segment};

/// Pet profiles and the breed catalogue they reference.
#[derive(Clone, Debug)]
pub struct PetService {
    client: ApiClient,
}

impl PetService {
    /// Wrap `client`.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Every pet visible to the current account.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn list(&self) -> Result<Vec<Pet>, ApiError> {
        let pets = self.client.get_json("/api/pets").await?;
        Ok(self.with_media(pets))
    }

    /// Pets belonging to one owner.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn by_owner(&self, owner_id: i64) -> Result<Vec<Pet>, ApiError> {
        let pets = self
            .client
            .get_json(&format!("/api/pets/owner/{owner_id}"))
            .await?;
        Ok(self.with_media(pets))
    }

    /// Pet detail.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    pub async fn get(&self, id: &str) -> Result<Pet, ApiError> {
        let mut pet: Pet = self
            .client
            .get_json(&format!("/api/pets/{}", segment(id)?))
            .await?;
        pet.image_url = resolve_media_url(&self.client.base_url(), pet.image_url.take());
        Ok(pet)
    }

    /// Register a pet for the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn create(&self, pet: &Pet) -> Result<Pet, ApiError> {
        self.client.post_json("/api/pets", pet).await
    }

    /// Replace a pet profile.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn update(&self, id: &str, pet: &Pet) -> Result<Pet, ApiError> {
        let path = format!("/api/pets/{}", segment(id)?);
        self.client.put_json(&path, pet).await
    }

    /// Remove a pet profile.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/api/pets/{}", segment(id)?);
        self.client.delete(&path, RequestOptions::new()).await
    }

    /// Full breed catalogue.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn breeds(&self) -> Result<Vec<Breed>, ApiError> {
        self.client.get_json("/api/breeds").await
    }

    /// Breeds of one animal type.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a type that cannot be placed
    /// in a path, otherwise the classified [`ApiError`].
    pub async fn breeds_by_animal_type(&self, animal_type: &str) -> Result<Vec<Breed>, ApiError> {
        let path = format!("/api/breeds/by-animal-type/{}", segment(animal_type)?);
        self.client.get_json(&path).await
    }

    /// Animal types the catalogue knows about.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn animal_types(&self) -> Result<Vec<AnimalType>, ApiError> {
        self.client.get_json("/api/breeds/animal-types").await
    }

    fn with_media(&self, pets: Vec<Pet>) -> Vec<Pet> {
        let base = self.client.base_url();
        pets.into_iter()
            .map(|mut pet| {
                pet.image_url = resolve_media_url(&base, pet.image_url.take());
                pet
            })
            .collect()
    }
}
