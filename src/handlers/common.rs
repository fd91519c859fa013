use crate::errors::{ApiError, ServiceError};
use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Standard no content response
pub fn no_content_response() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Parses a JSON body regardless of its content type. Account forms post
/// JSON without a JSON content type, and their failures are server errors.
pub fn parse_form_body<T: DeserializeOwned + Validate>(body: &Bytes) -> Result<T, ApiError> {
    let form: T = serde_json::from_slice(body)
        .map_err(|e| ServiceError::FormRejected(format!("malformed form: {}", e)))?;
    form.validate()
        .map_err(|e| ServiceError::FormRejected(e.to_string()))?;
    Ok(form)
}

/// `?currentPage=` paging used by the storefront
#[derive(Debug, Deserialize, Serialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub current_page: u64,
}

fn default_page() -> u64 {
    1
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            current_page: default_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Form {
        #[validate(length(min = 1))]
        username: String,
    }

    #[test]
    fn form_errors_are_server_errors() {
        let err = parse_form_body::<Form>(&Bytes::from_static(b"not json")).unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = parse_form_body::<Form>(&Bytes::from_static(br#"{"username": ""}"#)).unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn form_body_parses_without_content_type() {
        let form = parse_form_body::<Form>(&Bytes::from_static(br#"{"username": "bob"}"#)).unwrap();
        assert_eq!(form.username, "bob");
    }

    #[test]
    fn page_defaults_to_first() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.current_page, 1);
    }
}
