//! API models for rows, request and response payloads

use serde::Serialize;

pub mod athlete;
pub mod billing;
pub mod coach;
pub mod exercise;
pub mod program;
pub mod workout;

/// Plain `{"success": true}` acknowledgement
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
