use crate::db::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no token cookie on a protected route")]
    MissingToken,
    #[error("token rejected: {0}")]
    InvalidToken(String),
    #[error("token identity does not own the requested resource")]
    NotOwner,
    #[error("{0}")]
    Conflict(&'static str),
    #[error("rate limit exceeded")]
    TooManyRequests,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("failed to encode token: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn duplicate_bid() -> Self {
        AppError::Conflict("You have already placed a bid.")
    }

    fn message(&self) -> &str {
        match self {
            AppError::MissingToken | AppError::NotOwner => "unauthorized access",
            AppError::InvalidToken(_) => "invalid token",
            AppError::Conflict(message) => *message,
            AppError::TooManyRequests => "Too many requests. Please try again later.",
            AppError::Store(_) | AppError::TokenEncoding(_) | AppError::Internal(_) => {
                "internal server error"
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingToken | AppError::NotOwner => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            AppError::Store(_) | AppError::TokenEncoding(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        HttpResponse::build(status).json(ErrorResponse {
            message: self.message().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.error_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_auth_errors_map_to_401_and_403() {
        let (status, body) = body_of(AppError::MissingToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "unauthorized access");

        let (status, body) = body_of(AppError::NotOwner).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "unauthorized access");

        let (status, body) = body_of(AppError::InvalidToken("expired".into())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "invalid token");
    }

    #[actix_web::test]
    async fn test_duplicate_bid_is_conflict() {
        let (status, body) = body_of(AppError::duplicate_bid()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "You have already placed a bid.");
    }

    #[actix_web::test]
    async fn test_internal_errors_hide_cause() {
        let (status, body) = body_of(AppError::Store(StoreError::Corrupt("abc".into()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "internal server error");
    }
}
