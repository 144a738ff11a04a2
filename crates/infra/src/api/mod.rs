//! Canvas API access
//!
//! [`Api`] runs [`canvas_core::Requestable`] endpoints with token refresh and
//! rate-limit handling. Endpoint definitions live in [`requests`] and
//! [`graphql`].

pub mod client;
pub mod errors;
pub mod graphql;
pub mod requests;

pub use client::{Api, ApiResponse};
pub use errors::{ApiError, ApiErrorCategory};
pub use graphql::{GraphQlQuery, GraphQlRequest, UserCoursesQuery};
