//! # Canvas Infrastructure
//!
//! I/O side of the Canvas request pipeline.
//!
//! This crate contains:
//! - The reqwest-backed HTTP transport
//! - [`api::Api`], which runs requests with token refresh and rate-limit retry
//! - Token refresh coordination, the OAuth refresher and session stores
//! - REST and GraphQL endpoint definitions
//! - Configuration loading and logging setup
//!
//! ## Architecture
//! - Implements traits defined in `canvas-core`
//! - Depends on `canvas-domain` and `canvas-core`
//! - Contains all "impure" code (network, files)

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod logging;

// Re-export commonly used items
pub use api::{Api, ApiError, ApiErrorCategory, ApiResponse};
pub use auth::{
    FileSessionStore, InMemorySessionStore, NonInteractiveLogin, OAuthTokenRefresher,
    RefreshOutcome, SharedSession, TokenRefreshInteractor,
};
pub use http::{HttpClient, HttpClientBuilder};
