pub mod api;
pub mod assets;
pub mod auth;
pub mod community;
pub mod home;
pub mod notifications;
pub mod uploads;

use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::notification;
use crate::state::AppState;

/// Unread notification count for the navbar, zero when signed out.
pub(crate) fn unread_for(state: &AppState, user: Option<&CurrentUser>) -> AppResult<i64> {
    match user {
        Some(user) => Ok(notification::repository::unread_count(
            &state.db,
            &user.username,
        )?),
        None => Ok(0),
    }
}
