//! Report model matching the frontend Report interface.

use serde::{Deserialize, Serialize};

/// A moderation report filed against a post.
///
/// Independent of the post lifecycle: deleting the post does not delete its
/// reports unless both go together via the admin purge action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub post_id: String,
    /// Post content snapshotted at report time.
    pub post_content: String,
    /// Email of the reporting user.
    pub reported_by: String,
    pub reason: String,
    pub timestamp: String,
}

/// Request body for filing a report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub reason: String,
}
