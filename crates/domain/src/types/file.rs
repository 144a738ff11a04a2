//! File records
//!
//! https://canvas.instructure.com/doc/api/files.html

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{ids, iso8601};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFile {
    #[serde(deserialize_with = "ids::deserialize")]
    pub id: String,
    pub uuid: Option<String>,
    #[serde(default, deserialize_with = "ids::option::deserialize")]
    pub folder_id: Option<String>,
    pub display_name: String,
    pub filename: String,
    #[serde(rename = "content-type")]
    pub content_type: String,
    pub url: Option<String>,
    pub size: Option<u64>,
    #[serde(default, with = "iso8601::option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "iso8601::option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub hidden: bool,
    pub thumbnail_url: Option<String>,
    pub mime_class: Option<String>,
}
