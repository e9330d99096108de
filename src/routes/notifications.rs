use askama::Template;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;

use super::home::Html;
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::flash::{self, Flash};
use crate::notification;
use crate::state::AppState;

pub struct NotificationView {
    pub actor: String,
    pub message: String,
    pub when: String,
    pub is_read: bool,
}

#[derive(Template)]
#[template(path = "pages/notifications.html")]
pub struct NotificationsTemplate {
    pub user: Option<String>,
    pub unread: i64,
    pub flash: Option<Flash>,
    pub notifications: Vec<NotificationView>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications", get(page))
}

pub async fn page(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    headers: HeaderMap,
) -> AppResult<Response> {
    let Some(user) = maybe_user.0 else {
        return Ok(Redirect::to("/login").into_response());
    };

    let items = notification::repository::list_for_user(&state.db, &user.username, false)?;
    let unread = notification::repository::unread_count(&state.db, &user.username)?;

    let notifications = items
        .into_iter()
        .map(|n| NotificationView {
            message: match n.kind.as_str() {
                "like" => "liked your post".to_string(),
                other => n.content.clone().unwrap_or_else(|| other.to_string()),
            },
            actor: n.actor_name,
            when: n.created_at,
            is_read: n.is_read,
        })
        .collect();

    // Rendering the page counts as seeing everything on it.
    notification::repository::mark_all_read(&state.db, &user.username)?;

    let flash = flash::take(&headers);
    let had_flash = flash.is_some();

    let template = NotificationsTemplate {
        user: Some(user.username),
        unread,
        flash,
        notifications,
    };

    let mut response = Html(template).into_response();
    if had_flash {
        response
            .headers_mut()
            .append(header::SET_COOKIE, flash::clear_header_value());
    }
    Ok(response)
}
