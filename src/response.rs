use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A standardized response wrapper.
/// Every page-equivalent endpoint renders its context through this envelope.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful.
    pub success: bool,
    /// A message describing the result (mostly for errors or confirmations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The actual data payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Creates a success response with data.
    /// Status code defaults to 200 OK.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Creates a success response with a message and data.
    pub fn success_with_message(message: String, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

/// Implement IntoResponse for ApiResponse to simplify handler returns.
impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Field list of an unbound form, returned on GET of a form endpoint.
#[derive(Debug, Serialize)]
pub struct FormSchema {
    pub action: &'static str,
    pub fields: &'static [&'static str],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_omitted_when_absent() {
        let value = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "data": 1 }));
    }

    #[test]
    fn message_is_kept_when_present() {
        let value =
            serde_json::to_value(ApiResponse::success_with_message("hi".to_string(), 1)).unwrap();
        assert_eq!(value["message"], "hi");
    }
}
