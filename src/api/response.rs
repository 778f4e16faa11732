use serde::Serialize;

use crate::models::Pagination;

/// Envelope shared by every endpoint:
/// `{success, message, data?, pagination?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
            pagination: None,
        }
    }

    pub fn paginated(message: &str, data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data: Some(data),
            pagination: Some(pagination),
        }
    }
}
