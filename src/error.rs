use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::accounts::AccountError;
use crate::auth::AuthError;
use crate::community::CommunityError;
use crate::notification::NotificationError;
use crate::post::PostError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Pool(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The human-facing message carried in response bodies. Internal
    /// details stay out of it.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Forbidden(msg) | AppError::BadRequest(msg) => {
                msg.clone()
            }
            AppError::Unauthorized => "Unauthorized".to_string(),
            AppError::Database(_) | AppError::Pool(_) | AppError::Io(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {}", e),
            AppError::Pool(e) => tracing::error!("Pool error: {}", e),
            AppError::Io(e) => tracing::error!("I/O error: {}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }

        // Error bodies are JSON so clients can read `message` uniformly.
        let status = self.status();
        let message = self.message();
        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}

impl From<CommunityError> for AppError {
    fn from(err: CommunityError) -> Self {
        match err {
            CommunityError::NotFound => AppError::NotFound("Community not found".to_string()),
            CommunityError::AlreadyMember => {
                AppError::BadRequest("You are already a member of this community.".to_string())
            }
            CommunityError::NotMember => {
                AppError::BadRequest("You are not a member of this community.".to_string())
            }
            CommunityError::EmptyName => {
                AppError::BadRequest("Community name cannot be empty.".to_string())
            }
            CommunityError::Sql(e) => AppError::Database(e),
            CommunityError::Pool(e) => AppError::Pool(e),
        }
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::CommunityNotFound => {
                AppError::NotFound("Community not found".to_string())
            }
            PostError::NotFound => AppError::NotFound("Post not found".to_string()),
            PostError::AlreadyLiked => {
                AppError::BadRequest("You've already liked this post.".to_string())
            }
            PostError::NotMember => AppError::Forbidden(
                "Only members can post in this community.".to_string(),
            ),
            PostError::EmptyContent => {
                AppError::BadRequest("Post content cannot be empty.".to_string())
            }
            PostError::InvalidImage => {
                AppError::BadRequest("Image must be a valid URL.".to_string())
            }
            PostError::InvalidDate => {
                AppError::BadRequest("Date must be formatted as YYYY-MM-DD.".to_string())
            }
            PostError::Sql(e) => AppError::Database(e),
            PostError::Pool(e) => AppError::Pool(e),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken => {
                AppError::BadRequest("Email already in use.".to_string())
            }
            AccountError::UsernameTaken => {
                AppError::BadRequest("Username already in use.".to_string())
            }
            AccountError::InvalidCredentials => AppError::Unauthorized,
            AccountError::InvalidUsername => {
                AppError::BadRequest("Username cannot be empty.".to_string())
            }
            AccountError::Hash(e) => AppError::Internal(format!("password hash: {}", e)),
            AccountError::Sql(e) => AppError::Database(e),
            AccountError::Pool(e) => AppError::Pool(e),
        }
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound => {
                AppError::NotFound("Notification not found".to_string())
            }
            NotificationError::Sql(e) => AppError::Database(e),
            NotificationError::Pool(e) => AppError::Pool(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Sql(e) => AppError::Database(e),
            AuthError::Pool(e) => AppError::Pool(e),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(
            response_status(AppError::NotFound("Community not found".into())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn unauthorized_returns_401() {
        assert_eq!(
            response_status(AppError::Unauthorized),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn forbidden_returns_403() {
        assert_eq!(
            response_status(AppError::Forbidden("members only".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn bad_request_returns_400() {
        assert_eq!(
            response_status(AppError::BadRequest("oops".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_returns_500() {
        assert_eq!(
            response_status(AppError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn body_is_json_with_message_field() {
        let response = AppError::from(PostError::AlreadyLiked).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "You've already liked this post.");
    }
}
