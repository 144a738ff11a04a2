//! # Canvas Domain
//!
//! Plain data types shared by the Canvas API client crates.
//!
//! This crate contains:
//! - The persisted login session
//! - REST resource records returned by the API
//! - Configuration structures
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Canvas crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
