use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};

use crate::extractors::session_token;

pub const FLASH_COOKIE: &str = "huddle_flash";

const CLEAR_COOKIE: &str = "huddle_flash=; Path=/; Max-Age=0";

/// A message shown once on the next page render. Carried in a short-lived
/// cookie across the redirect that follows a form action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == FlashKind::Success
    }

    /// Cookie-safe form: a kind tag plus the hex-encoded message, so the
    /// text can hold spaces, quotes and anything else.
    fn encode(&self) -> String {
        let kind = match self.kind {
            FlashKind::Success => "ok",
            FlashKind::Error => "err",
        };
        format!("{}:{}", kind, hex_encode(self.message.as_bytes()))
    }

    fn decode(raw: &str) -> Option<Self> {
        let (kind, payload) = raw.split_once(':')?;
        let kind = match kind {
            "ok" => FlashKind::Success,
            "err" => FlashKind::Error,
            _ => return None,
        };
        let message = String::from_utf8(hex_decode(payload)?).ok()?;
        Some(Self { kind, message })
    }
}

/// The Set-Cookie value carrying a flash message.
pub fn cookie_value(flash: &Flash) -> String {
    format!(
        "{}={}; Path=/; Max-Age=60; SameSite=Lax",
        FLASH_COOKIE,
        flash.encode()
    )
}

/// Redirect that carries a message for the next page render.
pub fn redirect_with_flash(to: &str, flash: Flash) -> Response {
    ([(header::SET_COOKIE, cookie_value(&flash))], Redirect::to(to)).into_response()
}

/// Read the pending flash message from the request, if any.
pub fn take(headers: &HeaderMap) -> Option<Flash> {
    session_token(headers, FLASH_COOKIE).and_then(Flash::decode)
}

/// Set-Cookie value that expires a flash message once it has been shown.
pub fn clear_header_value() -> HeaderValue {
    HeaderValue::from_static(CLEAR_COOKIE)
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if !s.is_ascii() || s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
