//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped in the handlers via `clamp_limit` / `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Contact list filters (`?search=&tag=&limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct ContactListParams {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Campaign list filter (`?kind=broadcast|ad`).
#[derive(Debug, Deserialize)]
pub struct CampaignListParams {
    pub kind: Option<String>,
}
