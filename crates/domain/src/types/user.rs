//! User and profile records

use serde::{Deserialize, Serialize};

use crate::utils::ids;

/// https://canvas.instructure.com/doc/api/users.html#User
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    #[serde(deserialize_with = "ids::deserialize")]
    pub id: String,
    pub name: String,
    pub short_name: Option<String>,
    pub sortable_name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub pronouns: Option<String>,
}

/// https://canvas.instructure.com/doc/api/users.html#Profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiProfile {
    #[serde(deserialize_with = "ids::deserialize")]
    pub id: String,
    pub name: String,
    pub primary_email: Option<String>,
    pub login_id: Option<String>,
    pub avatar_url: Option<String>,
    pub time_zone: Option<String>,
    pub locale: Option<String>,
    pub pronouns: Option<String>,
}
