//! REST response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile of the authenticated user (`GET /api/users/me`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "displayname", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Space metadata (`GET /api/spaces/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceDetails {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tokens returned by the OAuth2 refresh grant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}
