use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use crate::application::categories::CategoryError;
use crate::application::error::ErrorReport;

const SOURCE: &str = "infra::http";

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION: &str = "validation_error";
    pub const NOT_FOUND: &str = "not_found";
    pub const PARTIAL_CASCADE: &str = "partial_cascade";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempted: Vec<Uuid>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    hint: Option<String>,
    attempted: Vec<Uuid>,
    chain: Vec<String>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            code,
            chain: vec![message.clone()],
            message,
            hint: None,
            attempted: Vec::new(),
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn invalid_id(rejection: PathRejection) -> Self {
        Self::bad_request("category id must be a UUID").with_hint(rejection.body_text())
    }

    pub fn invalid_body(rejection: JsonRejection) -> Self {
        Self::bad_request("request body is not valid category JSON")
            .with_hint(rejection.body_text())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        let mut api = match &err {
            CategoryError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, codes::VALIDATION, message.clone())
            }
            CategoryError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, err.to_string())
            }
            CategoryError::PartialCascade { attempted, .. } => {
                let mut api = Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    codes::PARTIAL_CASCADE,
                    err.to_string(),
                )
                .with_hint("retry the update to converge the remaining categories");
                api.attempted = attempted.clone();
                api
            }
            CategoryError::StoreUnavailable(_) => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::STORE_UNAVAILABLE,
                err.to_string(),
            )
            .with_hint("retry later"),
        };
        api.chain = ErrorReport::from_error(SOURCE, api.status, &err).messages;
        api
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                hint: self.hint,
                attempted: self.attempted,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport {
            source: SOURCE,
            status: self.status,
            messages: self.chain,
        }
        .attach(&mut response);
        response
    }
}
