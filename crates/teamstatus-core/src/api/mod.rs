//! REST client for the teams backend.
//!
//! `ApiClient` implements `TeamRepository` over the backend's JSON API
//! (`GET/POST/PUT/DELETE` on `/api/teams`). HTTP status failures surface as
//! `ApiError` wrapped in `anyhow::Error`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
