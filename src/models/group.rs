//! Group ("sector") model matching the frontend Group interface.

use serde::{Deserialize, Serialize};

/// A group of posts. Membership is initialized with the creator but never
/// enforced: any authenticated user can post into any group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub members: Vec<String>,
    pub created_at: String,
}

/// Request body for creating a new group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
