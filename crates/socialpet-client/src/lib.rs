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
#![allow(clippy::module_name_repetitions)]

//! Session-aware HTTP client for the SocialPet backend.
//!
//! Every screen talks to the backend through [`ApiClient::request`] (or the
//! typed wrappers in [`services`]). The client attaches the current bearer
//! token, classifies failures into [`ApiError`], and ends the session exactly
//! once per expiry episode when the backend answers 401, however many
//! requests were in flight.
//!
//! Layout:
//! - `store.rs`: synchronous key-value persistence (`MemoryStore`, `FileStore`)
//! - `session.rs`: session state machine and single-flight expiry guard
//! - `navigation.rs`: queued "go to login" intent
//! - `error.rs`: error taxonomy and response classification
//! - `request.rs`: request description and URL resolution
//! - `client.rs`: transport and the fixed request pipeline
//! - `refresh.rs`: optional single-flight token refresh
//! - `services/`: typed wrappers for the backend endpoints

pub mod client;
pub mod error;
pub mod navigation;
mod refresh;
pub mod request;
pub mod services;
pub mod session;
pub mod store;

pub use client::ApiClient;
pub use error::{ApiError, ClientSetupError, ErrorKind, NetworkFailure};
pub use navigation::{LoginNavigator, NavigationGate, NavigationOutcome};
pub use request::{Method, RequestOptions};
pub use services::{
    AdoptionService, AuthError, AuthService, DonationService, LostPetService, PetService,
    UserService,
};
pub use session::{Session, SessionError, SessionSnapshot, SessionState, UserProfile};
pub use socialpet_config::{ClientConfig, RefreshPolicy};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
