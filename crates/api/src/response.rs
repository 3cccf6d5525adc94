//! Shared response envelope types for API handlers.
//!
//! Resource routes use a `{ "data": ... }` envelope. Action handlers use
//! `{ "success": true, "data": ... }`; their failures go through
//! [`AppError`](crate::error::AppError) like every other route.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "success": true, "data": T }` envelope returned by action handlers.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
