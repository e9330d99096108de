use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::accounts;
use crate::auth::session;
use crate::community;
use crate::db::models::{Community, Notification, Post};
use crate::error::{AppError, AppResult};
use crate::notification;
use crate::post::repository as post_repo;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/communities",
            get(list_communities).post(create_community),
        )
        .route(
            "/api/communities/{id}",
            get(get_community)
                .put(update_community)
                .delete(delete_community),
        )
        .route("/api/communities/{id}/join", post(join_community))
        .route("/api/communities/{id}/leave", post(leave_community))
        .route("/api/communities/{id}/posts", get(list_posts).post(create_post))
        .route(
            "/api/communities/{id}/posts/{post_id}/like",
            post(like_post),
        )
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", post(mark_notification_read))
}

/// Identity travels as a `userName` query parameter on membership and
/// like calls.
#[derive(Deserialize)]
pub struct UserNameQuery {
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

fn require_user_name(user_name: Option<String>) -> Result<String, AppError> {
    user_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("userName query parameter is required.".to_string()))
}

pub async fn list_communities(State(state): State<AppState>) -> AppResult<Json<Vec<Community>>> {
    Ok(Json(community::repository::list_all(&state.db)?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create_community(
    State(state): State<AppState>,
    Json(payload): Json<CommunityPayload>,
) -> AppResult<Json<Community>> {
    let community =
        community::repository::create(&state.db, &payload.name, &payload.description)?;
    Ok(Json(community))
}

pub async fn get_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Community>> {
    Ok(Json(community::repository::find(&state.db, &id)?))
}

/// PUT replaces name and description wholesale.
pub async fn update_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CommunityPayload>,
) -> AppResult<Json<Community>> {
    Ok(Json(community::repository::update(
        &state.db,
        &id,
        &payload.name,
        &payload.description,
    )?))
}

pub async fn delete_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    community::repository::delete(&state.db, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn join_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UserNameQuery>,
) -> AppResult<Json<Community>> {
    let user_name = require_user_name(query.user_name)?;
    community::repository::join(&state.db, &id, &user_name)?;
    Ok(Json(community::repository::find(&state.db, &id)?))
}

pub async fn leave_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UserNameQuery>,
) -> AppResult<Json<Community>> {
    let user_name = require_user_name(query.user_name)?;
    community::repository::leave(&state.db, &id, &user_name)?;
    Ok(Json(community::repository::find(&state.db, &id)?))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(post_repo::list_for_community(&state.db, &id)?))
}

/// Clients may also send `likes` and `communityId`; both are ignored,
/// the server assigns them.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub author: String,
    #[serde(default)]
    pub date: Option<String>,
}

pub async fn create_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreatePostPayload>,
) -> AppResult<Json<Post>> {
    let post = post_repo::create(
        &state.db,
        &id,
        post_repo::NewPost {
            author: payload.author,
            content: payload.content,
            image: payload.image,
            date: payload.date,
        },
    )?;
    Ok(Json(post))
}

pub async fn like_post(
    State(state): State<AppState>,
    Path((id, post_id)): Path<(String, String)>,
    Query(query): Query<UserNameQuery>,
) -> AppResult<Json<Post>> {
    let user_name = require_user_name(query.user_name)?;
    let post = post_repo::like(&state.db, &id, &post_id, &user_name)?;

    if let Err(e) = notification::repository::notify_like(&state.db, &post, &user_name) {
        tracing::warn!("Error recording like notification: {}", e);
    }
    Ok(Json(post))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub message: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<Json<AuthResponse>> {
    let user = accounts::repository::register(
        &state.db,
        &payload.username,
        &payload.email,
        &payload.password,
    )?;
    let token = session::create_session(&state.db, &user.id, state.config.auth.session_hours)?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        username: user.username,
        message: "User registered successfully".to_string(),
    }))
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<AuthResponse>> {
    let user = accounts::repository::verify_login(&state.db, &payload.email, &payload.password)?;
    let token = session::create_session(&state.db, &user.id, state.config.auth.session_hours)?;

    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        message: format!("Welcome back, {}!", user.username),
        username: user.username,
    }))
}

#[derive(Deserialize)]
pub struct NotificationsQuery {
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(default)]
    pub unread: Option<bool>,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let user_name = require_user_name(query.user_name)?;
    let unread_only = query.unread.unwrap_or(false);
    Ok(Json(notification::repository::list_for_user(
        &state.db,
        &user_name,
        unread_only,
    )?))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    notification::repository::mark_read(&state.db, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_user_name_accepts_present_name() {
        assert_eq!(
            require_user_name(Some("maya".to_string())).unwrap(),
            "maya"
        );
    }

    #[test]
    fn require_user_name_rejects_missing_or_empty() {
        assert!(require_user_name(None).is_err());
        assert!(require_user_name(Some(String::new())).is_err());
    }
}
