//! HTTP transport

pub mod client;
pub mod multipart;

pub use client::{HttpClient, HttpClientBuilder};
