use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use super::home::Html;
use crate::community::{self, CommunityError};
use crate::db::models::{Community, Post};
use crate::error::{AppError, AppResult};
use crate::extractors::MaybeUser;
use crate::flash::{self, Flash};
use crate::notification;
use crate::post::repository as post_repo;
use crate::post::PostError;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/community.html")]
pub struct CommunityTemplate {
    pub user: Option<String>,
    pub unread: i64,
    pub flash: Option<Flash>,
    pub community: Community,
    pub posts: Vec<PostView>,
    pub is_member: bool,
    pub edit_mode: bool,
}

/// A post prepared for rendering: author initial for the avatar and a
/// long-form date.
pub struct PostView {
    pub id: String,
    pub author: String,
    pub initial: char,
    pub content: String,
    pub image: Option<String>,
    pub date: String,
    pub likes: i64,
}

fn post_view(post: Post) -> PostView {
    let date = NaiveDate::parse_from_str(&post.date, "%Y-%m-%d")
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| post.date.clone());
    PostView {
        initial: post.author.chars().next().unwrap_or('?').to_ascii_uppercase(),
        id: post.id,
        author: post.author,
        content: post.content,
        image: post.image,
        date,
        likes: post.likes,
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/community/{id}", get(page))
        .route("/community/{id}/join", post(join))
        .route("/community/{id}/leave", post(leave))
        .route("/community/{id}/posts", post(create_post))
        .route("/community/{id}/posts/{post_id}/like", post(like))
        .route("/community/{id}/edit", post(update))
        .route("/community/{id}/delete", post(delete))
}

fn community_url(id: &str) -> String {
    format!("/community/{}", id)
}

/// Writes require a signed-in user; without one nothing is touched and
/// the browser lands on the login page with an explanation.
fn sign_in_required() -> Response {
    flash::redirect_with_flash(
        "/login",
        Flash::error("You must be signed in to perform this action."),
    )
}

fn flash_failure(back: &str, err: AppError) -> Response {
    let to = if matches!(err, AppError::NotFound(_)) {
        "/"
    } else {
        back
    };
    flash::redirect_with_flash(to, Flash::error(err.message()))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub edit: Option<String>,
}

pub async fn page(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
    maybe_user: MaybeUser,
    headers: HeaderMap,
) -> AppResult<Response> {
    let community = community::repository::find(&state.db, &id)?;
    let posts = post_repo::list_for_community(&state.db, &id)?;

    let user = maybe_user.0;
    let unread = super::unread_for(&state, user.as_ref())?;
    let user = user.map(|u| u.username);
    let is_member = match &user {
        Some(name) => community.members.iter().any(|m| m == name),
        None => false,
    };

    let flash = flash::take(&headers);
    let had_flash = flash.is_some();

    let template = CommunityTemplate {
        user,
        unread,
        flash,
        community,
        posts: posts.into_iter().map(post_view).collect(),
        is_member,
        edit_mode: query.edit.is_some(),
    };

    let mut response = Html(template).into_response();
    if had_flash {
        response
            .headers_mut()
            .append(header::SET_COOKIE, flash::clear_header_value());
    }
    Ok(response)
}

pub async fn join(
    State(state): State<AppState>,
    Path(id): Path<String>,
    maybe_user: MaybeUser,
) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(sign_in_required());
    };

    match community::repository::join(&state.db, &id, &user.username) {
        Ok(()) => Ok(flash::redirect_with_flash(
            &community_url(&id),
            Flash::success("You have joined the community!"),
        )),
        Err(e) => {
            tracing::warn!("Error joining community {}: {}", id, e);
            Ok(flash_failure(&community_url(&id), e.into()))
        }
    }
}

pub async fn leave(
    State(state): State<AppState>,
    Path(id): Path<String>,
    maybe_user: MaybeUser,
) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(sign_in_required());
    };

    match community::repository::leave(&state.db, &id, &user.username) {
        Ok(()) => Ok(flash::redirect_with_flash(
            &community_url(&id),
            Flash::success("You have left the community."),
        )),
        Err(e) => {
            tracing::warn!("Error leaving community {}: {}", id, e);
            Ok(flash_failure(&community_url(&id), e.into()))
        }
    }
}

#[derive(Deserialize)]
pub struct NewPostForm {
    pub content: String,
    pub image: Option<String>,
}

pub async fn create_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    maybe_user: MaybeUser,
    Form(form): Form<NewPostForm>,
) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(sign_in_required());
    };

    let new_post = post_repo::NewPost {
        author: user.username,
        content: form.content,
        image: form.image,
        date: None,
    };
    if let Err(e) = post_repo::create(&state.db, &id, new_post) {
        tracing::warn!("Error adding post to {}: {}", id, e);
    }
    Ok(Redirect::to(&community_url(&id)).into_response())
}

pub async fn like(
    State(state): State<AppState>,
    Path((id, post_id)): Path<(String, String)>,
    maybe_user: MaybeUser,
) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(sign_in_required());
    };

    match post_repo::like(&state.db, &id, &post_id, &user.username) {
        Ok(post) => {
            if let Err(e) = notification::repository::notify_like(&state.db, &post, &user.username)
            {
                tracing::warn!("Error recording like notification: {}", e);
            }
            Ok(Redirect::to(&community_url(&id)).into_response())
        }
        Err(PostError::AlreadyLiked) => Ok(flash::redirect_with_flash(
            &community_url(&id),
            Flash::error("You've already liked this post."),
        )),
        Err(e) => {
            tracing::warn!("Error liking post {}: {}", post_id, e);
            Ok(Redirect::to(&community_url(&id)).into_response())
        }
    }
}

#[derive(Deserialize)]
pub struct EditCommunityForm {
    pub name: String,
    pub description: String,
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<EditCommunityForm>,
) -> AppResult<Response> {
    match community::repository::update(&state.db, &id, &form.name, &form.description) {
        Ok(_) => Ok(flash::redirect_with_flash(
            &community_url(&id),
            Flash::success("Community updated successfully!"),
        )),
        Err(e) => {
            tracing::warn!("Error updating community {}: {}", id, e);
            let to = if matches!(e, CommunityError::NotFound) {
                "/".to_string()
            } else {
                community_url(&id)
            };
            Ok(flash::redirect_with_flash(
                &to,
                Flash::error("Update failed. Please try again."),
            ))
        }
    }
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Response> {
    match community::repository::delete(&state.db, &id) {
        Ok(()) => Ok(flash::redirect_with_flash(
            "/",
            Flash::success("Community deleted successfully!"),
        )),
        Err(e) => {
            tracing::warn!("Error deleting community {}: {}", id, e);
            let to = if matches!(e, CommunityError::NotFound) {
                "/".to_string()
            } else {
                community_url(&id)
            };
            Ok(flash::redirect_with_flash(
                &to,
                Flash::error("An error occurred while deleting the community."),
            ))
        }
    }
}
