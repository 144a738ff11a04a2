//! Shared serde helpers for domain records

pub mod ids;
pub mod iso8601;
