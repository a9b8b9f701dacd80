//! Learning resources

use serde::{Deserialize, Serialize};

/// A curated learning resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub description: String,
    pub long_description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: String,
    pub path: String,
}
