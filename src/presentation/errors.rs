// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::domain::repositories::RepositoryError;
use crate::domain::services::ServiceError;

/// 携带状态码的 HTTP 错误，用于提取器与中间件
#[derive(Error, Debug)]
#[error("{message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

/// 统一的错误响应体 `{statusCode, error, message}`
pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "statusCode": status.as_u16(),
        "error": status.canonical_reason().unwrap_or("Error"),
        "message": message,
    }));
    (status, body).into_response()
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        error_response(self.status, &self.message)
    }
}

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按具体错误类型选择状态码
#[derive(Debug)]
pub struct AppError(anyhow::Error);

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        if let Some(err) = self.0.downcast_ref::<HttpError>() {
            return err.status;
        }
        if let Some(err) = self.0.downcast_ref::<ServiceError>() {
            return match err {
                ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
                ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::Repository(e) => repository_status(e),
                ServiceError::Storage(_) | ServiceError::Pdf(_) | ServiceError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
        }
        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            return repository_status(err);
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
            return error_response(status, "Internal server error");
        }

        error_response(status, &self.0.to_string())
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_service_errors_map_to_status_and_body() {
        let response = AppError::from(ServiceError::Conflict("Email already in use".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_of(response).await;
        assert_eq!(body["statusCode"], 409);
        assert_eq!(body["error"], "Conflict");
        assert_eq!(body["message"], "Email already in use");

        let response = AppError::from(ServiceError::Repository(RepositoryError::NotFound)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let response = AppError::from(ServiceError::Internal("pool exhausted".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert_eq!(body["message"], "Internal server error");

        let response = AppError::from(HttpError::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests")).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_of(response).await["error"], "Too Many Requests");
    }
}
