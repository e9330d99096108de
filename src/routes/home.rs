use askama::Template;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::community;
use crate::db::models::Community;
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::flash::{self, Flash};
use crate::state::AppState;

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

/// A suggested training partner shown in the home sidebar.
pub struct Athlete {
    pub name: &'static str,
    pub sport: &'static str,
    pub skills: &'static [&'static str],
}

/// An upcoming group session shown in the home sidebar.
pub struct TrainingSession {
    pub title: &'static str,
    pub location: &'static str,
    pub time: &'static str,
}

const ATHLETES_TO_CONNECT: &[Athlete] = &[
    Athlete {
        name: "Maya Chen",
        sport: "Trail running",
        skills: &["Pacing", "Hill repeats"],
    },
    Athlete {
        name: "Carlos Reyes",
        sport: "Climbing",
        skills: &["Belaying", "Route reading"],
    },
    Athlete {
        name: "Aisha Patel",
        sport: "Swimming",
        skills: &["Open water", "Technique drills"],
    },
];

const TRAINING_SESSIONS: &[TrainingSession] = &[
    TrainingSession {
        title: "Saturday Long Run",
        location: "Riverside Park",
        time: "Sat 7:00 AM",
    },
    TrainingSession {
        title: "Bouldering Basics",
        location: "Crux Climbing Gym",
        time: "Tue 6:30 PM",
    },
    TrainingSession {
        title: "Masters Swim",
        location: "City Aquatic Center",
        time: "Thu 5:45 AM",
    },
];

#[derive(Template)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub user: Option<String>,
    pub unread: i64,
    pub flash: Option<Flash>,
    pub communities: Vec<Community>,
    pub athletes: &'static [Athlete],
    pub sessions: &'static [TrainingSession],
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/communities", post(create_community))
}

pub async fn index(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    headers: HeaderMap,
) -> AppResult<Response> {
    let communities = community::repository::list_all(&state.db)?;
    let user = maybe_user.0;
    let unread = super::unread_for(&state, user.as_ref())?;

    let flash = flash::take(&headers);
    let had_flash = flash.is_some();

    let template = HomeTemplate {
        user: user.map(|u| u.username),
        unread,
        flash,
        communities,
        athletes: ATHLETES_TO_CONNECT,
        sessions: TRAINING_SESSIONS,
    };

    let mut response = Html(template).into_response();
    if had_flash {
        response
            .headers_mut()
            .append(header::SET_COOKIE, flash::clear_header_value());
    }
    Ok(response)
}

#[derive(Deserialize)]
pub struct CreateCommunityForm {
    pub name: String,
    pub description: String,
}

/// Create a community from the home page form and return to the list,
/// where the new entry shows up at the end.
pub async fn create_community(
    State(state): State<AppState>,
    Form(form): Form<CreateCommunityForm>,
) -> AppResult<Response> {
    match community::repository::create(&state.db, &form.name, &form.description) {
        Ok(community) => {
            tracing::info!("Created community {} ({})", community.name, community.id);
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!("Error creating community: {}", e);
            Ok(Redirect::to("/").into_response())
        }
    }
}
