//! # Canvas Core
//!
//! Transport-free pieces of the Canvas request pipeline.
//!
//! This crate contains:
//! - The [`Requestable`] trait and request building
//! - Query items, multipart forms, the JSON codec and `Link` parsing
//! - Port interfaces for token refresh, re-login and session storage
//!
//! ## Architecture Principles
//! - Only depends on `canvas-domain`
//! - No HTTP client or file-system code
//! - All external dependencies via traits

pub mod codec;
pub mod form;
pub mod links;
pub mod ports;
pub mod query;
pub mod requestable;

pub use codec::CodecError;
pub use form::{FormData, FormValue};
pub use links::Links;
pub use ports::{AccessTokenRefresher, LoginAgain, LoginAgainError, SessionStore, TokenError};
pub use query::{QueryItem, QueryPair};
pub use requestable::{
    ApiMethod, GetNextRequest, NoContent, PreparedRequest, RequestContext, RequestError,
    Requestable,
};
