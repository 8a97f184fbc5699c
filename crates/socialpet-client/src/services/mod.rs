//! Typed wrappers around the backend endpoints the screens use.
//!
//! Each service holds a cloned [`ApiClient`](crate::ApiClient); all of them
//! share one session and one transport.

mod adoption;
mod auth;
mod donations;
mod lost_pets;
mod pets;
mod users;

pub use adoption::AdoptionService;
pub use auth::{AuthError, AuthService};
pub use donations::DonationService;
pub use lost_pets::LostPetService;
pub use pets::PetService;
pub use users::UserService;

use url::Url;

use crate::error::ApiError;

/// Validate a value interpolated into a path as a single segment.
pub(crate) fn segment(value: &str) -> Result<&str, ApiError> {
    let value = value.trim();
    if value.is_empty() || matches!(value, "." | "..") || value.contains(['/', '?', '#', '%']) {
        return Err(ApiError::invalid(format!("`{value}` is not a valid path segment")));
    }
    Ok(value)
}

/// Resolve a media URL that may be relative to the API origin. Only
/// `http`/`https` results are kept.
pub(crate) fn resolve_media_url(base: &Url, raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    base.join(trimmed)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::Result;
    use httpmock::MockServer;
    use socialpet_config::ClientConfig;

    use crate::client::ApiClient;
    use crate::session::Session;
    use crate::store::MemoryStore;

    pub(crate) fn client_for(server: &MockServer) -> Result<ApiClient> {
        let session = Arc::new(Session::restore(Arc::new(MemoryStore::new())));
        let config = ClientConfig::new(&server.base_url(), Duration::from_secs(5))?;
        Ok(ApiClient::new(&config, session)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn media_urls_resolve_against_base() -> Result<()> {
        let base = Url::parse("http://localhost:8080")?;
        assert_eq!(
            resolve_media_url(&base, Some("/uploads/milo.jpg".into())).as_deref(),
            Some("http://localhost:8080/uploads/milo.jpg")
        );
        assert_eq!(
            resolve_media_url(&base, Some("uploads/milo.jpg".into())).as_deref(),
            Some("http://localhost:8080/uploads/milo.jpg")
        );
        assert_eq!(
            resolve_media_url(&base, Some("https://cdn.example.com/milo.jpg".into())).as_deref(),
            Some("https://cdn.example.com/milo.jpg")
        );
        assert_eq!(
            resolve_media_url(&base, Some("//cdn.example.com/x.jpg".into())).as_deref(),
            Some("http://cdn.example.com/x.jpg")
        );
        assert_eq!(resolve_media_url(&base, Some("javascript:alert(1)".into())), None);
        assert_eq!(resolve_media_url(&base, Some("  ".into())), None);
        assert_eq!(resolve_media_url(&base, None), None);
        Ok(())
    }

    #[test]
    fn segments_reject_traversal_and_separators() {
        assert_eq!(segment(" kedi-123 ").ok(), Some("kedi-123"));
        for bad in ["", "a/b", "..", "x?y=1", "50%"] {
            assert!(segment(bad).is_err(), "{bad}");
        }
    }
}
