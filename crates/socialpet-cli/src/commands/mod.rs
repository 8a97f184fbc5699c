//! Command handlers grouped by concern.

pub(crate) mod auth;
pub(crate) mod listings;
pub(crate) mod pets;
pub(crate) mod raw;
