use askama::Template;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use super::home::Html;
use crate::accounts::{self, AccountError};
use crate::auth::session;
use crate::error::{AppError, AppResult};
use crate::extractors::{self, MaybeUser};
use crate::flash::{self, Flash};
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub user: Option<String>,
    pub unread: i64,
    pub flash: Option<Flash>,
}

#[derive(Template)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub user: Option<String>,
    pub unread: i64,
    pub flash: Option<Flash>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/register", get(register_page).post(register))
        .route("/logout", post(logout))
}

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

fn rendered_auth_page<T: Template>(template: T, had_flash: bool) -> Response {
    let mut response = Html(template).into_response();
    if had_flash {
        response
            .headers_mut()
            .append(header::SET_COOKIE, flash::clear_header_value());
    }
    response
}

pub async fn login_page(maybe_user: MaybeUser, headers: HeaderMap) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let flash = flash::take(&headers);
    let had_flash = flash.is_some();
    Ok(rendered_auth_page(
        LoginTemplate {
            user: None,
            unread: 0,
            flash,
        },
        had_flash,
    ))
}

pub async fn register_page(maybe_user: MaybeUser, headers: HeaderMap) -> AppResult<Response> {
    if maybe_user.0.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let flash = flash::take(&headers);
    let had_flash = flash.is_some();
    Ok(rendered_auth_page(
        RegisterTemplate {
            user: None,
            unread: 0,
            flash,
        },
        had_flash,
    ))
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    match accounts::repository::verify_login(&state.db, &form.email, &form.password) {
        Ok(user) => {
            let hours = state.config.auth.session_hours;
            let token = session::create_session(&state.db, &user.id, hours)?;
            let welcome = Flash::success(format!("Welcome back, {}!", user.username));

            Ok((
                AppendHeaders([
                    (
                        header::SET_COOKIE,
                        session_cookie(&state.config.auth.cookie_name, &token, hours),
                    ),
                    (header::SET_COOKIE, flash::cookie_value(&welcome)),
                ]),
                Redirect::to("/"),
            )
                .into_response())
        }
        Err(AccountError::InvalidCredentials) => Ok(flash::redirect_with_flash(
            "/login",
            Flash::error("Invalid email or password."),
        )),
        Err(e) => Err(e.into()),
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    match accounts::repository::register(&state.db, &form.username, &form.email, &form.password) {
        Ok(user) => {
            let hours = state.config.auth.session_hours;
            let token = session::create_session(&state.db, &user.id, hours)?;
            let welcome = Flash::success(format!("Welcome, {}!", user.username));

            Ok((
                AppendHeaders([
                    (
                        header::SET_COOKIE,
                        session_cookie(&state.config.auth.cookie_name, &token, hours),
                    ),
                    (header::SET_COOKIE, flash::cookie_value(&welcome)),
                ]),
                Redirect::to("/"),
            )
                .into_response())
        }
        Err(
            e @ (AccountError::EmailTaken
            | AccountError::UsernameTaken
            | AccountError::InvalidUsername),
        ) => Ok(flash::redirect_with_flash(
            "/register",
            Flash::error(AppError::from(e).message()),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = extractors::session_token(&headers, &state.config.auth.cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        [(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )],
        Redirect::to("/login"),
    )
        .into_response())
}
