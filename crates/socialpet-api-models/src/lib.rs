#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs)]
#![allow(clippy::multiple_crate_versions)]
//! Shared HTTP DTOs for the SocialPet backend API.
//!
//! The backend speaks camelCase JSON. Listing payloads are carried through
//! the client untouched apart from asset URL resolution, so most optional
//! fields default rather than fail when the server omits them.
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Error envelope returned by the backend on 4xx/5xx responses.
///
/// The backend is not consistent about which field carries the text: Spring
/// style handlers use `message`/`error`, problem documents use
/// `detail`/`title`. All are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Human-readable message set by most handlers.
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Detailed diagnostic (RFC 9457 `detail`).
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Short error label (e.g. `Bad Request`).
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Problem title (RFC 9457 `title`).
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Status echoed by the server, when present.
    pub status: Option<u16>,
}

impl ServerMessage {
    /// First non-blank text field, preferring the most specific one.
    #[must_use]
    pub fn best_message(&self) -> Option<&str> {
        [&self.message, &self.detail, &self.error, &self.title]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|text| !text.is_empty())
    }
}

/// Identifier that the backend emits either as a number or a string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ListingId {
    /// Numeric database identifier.
    Number(i64),
    /// String identifier (UUID or slug).
    Text(String),
}

impl Display for ListingId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(formatter, "{value}"),
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

impl From<i64> for ListingId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Credentials submitted to `/api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password; only ever sent over the configured transport.
    pub password: String,
}

/// Account registration form submitted to `/api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Public handle.
    pub user_name: String,
    /// Account email.
    pub email: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Chosen password.
    pub password: String,
    /// Password confirmation; the backend checks it matches.
    pub confirm_password: String,
}

/// Payload for `/auth/forgot-password`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForgotPasswordRequest {
    /// Account email to send the reset link to.
    pub email: String,
}

/// Payload for `/auth/reset-password`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    /// Reset token from the emailed link.
    pub token: String,
    /// New password.
    pub password: String,
}

/// User block embedded in [`AuthResponse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthUser {
    /// Account identifier.
    pub user_id: String,
    /// Account email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Public handle.
    pub username: String,
    /// Registration date as formatted by the backend.
    pub join_date: Option<String>,
    /// Avatar image URL.
    pub avatar_url: Option<String>,
    /// Role name (`USER`, `ADMIN`, ...).
    pub role: String,
}

impl AuthUser {
    /// Name suitable for greeting the user; falls back to the handle, then the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        if !self.username.trim().is_empty() {
            return self.username.trim().to_string();
        }
        self.email.clone()
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer credential for subsequent requests.
    pub access_token: String,
    /// Profile of the signed-in account.
    pub user: AuthUser,
}

/// Response of the token refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshTokenResponse {
    /// Replacement bearer credential.
    #[serde(alias = "accessToken")]
    pub token: String,
}

/// Account as returned by `/api/v1/users/me` and `/api/v1/users/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserAccount {
    /// Account identifier.
    pub id: String,
    /// Public handle.
    pub username: String,
    /// Account email.
    pub email: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// Role name.
    pub role: Option<String>,
    /// Moderation status (`ACTIVE`, `PENDING`, ...).
    pub status: Option<String>,
    /// Creation timestamp as formatted by the backend.
    pub created_at: Option<String>,
}

/// Adoption listing as served by `/api/v1/adoption/*`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionListing {
    /// Listing identifier.
    pub id: ListingId,
    /// Listing headline.
    #[serde(default)]
    pub title: String,
    /// Name of the animal.
    #[serde(default)]
    pub pet_name: String,
    /// Breed description.
    #[serde(default)]
    pub breed: String,
    /// Age; the backend sends either a number or free text.
    #[serde(default)]
    pub age: serde_json::Value,
    /// Gender label.
    #[serde(default)]
    pub gender: String,
    /// Size label.
    #[serde(default)]
    pub size: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// District within the city.
    #[serde(default)]
    pub district: String,
    /// Contact name.
    #[serde(default)]
    pub full_name: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: String,
    /// Photo URL; may be relative to the API origin.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Creation timestamp as formatted by the backend.
    #[serde(default)]
    pub created_at: String,
    /// Listing status.
    #[serde(default)]
    pub status: String,
    /// Animal type (`cat`, `dog`, ...).
    #[serde(default)]
    pub animal_type: Option<String>,
    /// View counter.
    #[serde(default)]
    pub view_count: Option<u64>,
    /// Moderation state.
    #[serde(default)]
    pub approval_status: Option<String>,
    /// Where the listing originated.
    #[serde(default)]
    pub source: Option<String>,
    /// URL slug used by the detail endpoint.
    #[serde(default)]
    pub slug: Option<String>,
}

/// Create/update payload for adoption listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionListingRequest {
    /// Listing headline.
    pub title: String,
    /// Name of the animal.
    pub pet_name: String,
    /// Animal type (`cat`, `dog`, ...).
    pub animal_type: String,
    /// Breed description.
    pub breed: String,
    /// Age as entered by the user.
    pub age: String,
    /// Gender label.
    pub gender: String,
    /// Size label.
    pub size: String,
    /// Free-form description.
    pub description: String,
    /// City.
    pub city: String,
    /// District within the city.
    pub district: String,
    /// Contact name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
}

/// Lost-pet report as served by `/api/lostpets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LostPet {
    /// Report identifier; absent on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Report headline.
    pub title: String,
    /// Primary image reference.
    pub image: String,
    /// Area where the animal went missing.
    pub location: String,
    /// Report time in epoch milliseconds.
    pub timestamp: i64,
    /// Animal type.
    pub animal_type: String,
    /// Description of the animal.
    pub details: String,
    /// Report status (`LOST`, `FOUND`, ...).
    pub status: String,
    /// Extra notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    /// Owner account identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// View counter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    /// How to reach the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    /// Last sighting date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_date: Option<String>,
    /// Last sighting place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen_location: Option<String>,
    /// Photo URL; may be relative to the API origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Organization accepting donations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationOrganization {
    /// Organization identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Mission statement.
    pub description: String,
    /// Contact phone.
    pub phone_number: String,
    /// Bank account for transfers.
    pub iban: String,
    /// Logo URL; may be relative to the API origin.
    pub image_url: Option<String>,
    /// Postal address.
    pub address: String,
    /// Website URL.
    pub website: Option<String>,
    /// Facebook page.
    pub facebook_url: Option<String>,
    /// Twitter profile.
    pub twitter_url: Option<String>,
    /// Instagram profile.
    pub instagram_url: Option<String>,
    /// Whether the organization is listed publicly.
    pub active: bool,
    /// Creation timestamp as formatted by the backend.
    pub created_at: String,
}

/// Pet profile as served by `/api/pets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Pet {
    /// Pet identifier; absent on create.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ListingId>,
    /// Name of the animal.
    pub name: String,
    /// Age in years.
    pub age: u32,
    /// Gender label.
    pub gender: String,
    /// Animal type (`DOG`, `CAT`, ...).
    pub animal_type: String,
    /// Owner account; filled in by the backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    /// Breed identifier from `/api/breeds`.
    pub breed_id: i64,
    /// Photo URL; may be relative to the API origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Breed entry from `/api/breeds`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Breed {
    /// Breed identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Animal type the breed belongs to.
    pub animal_type: String,
}

/// Animal type from `/api/breeds/animal-types`. The backend sends either
/// bare strings or `{ "name": ... }` objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "AnimalTypeRepr")]
pub struct AnimalType {
    /// Type name.
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnimalTypeRepr {
    Bare(String),
    Named { name: String },
}

impl From<AnimalTypeRepr> for AnimalType {
    fn from(repr: AnimalTypeRepr) -> Self {
        match repr {
            AnimalTypeRepr::Bare(name) | AnimalTypeRepr::Named { name } => Self { name },
        }
    }
}
