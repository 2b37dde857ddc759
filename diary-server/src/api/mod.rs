//! HTTP API handlers
//!
//! Client identity rides in an opaque cookie. The server mints the
//! identifier on first contact and only trusts identifiers it issued.

pub mod diary;
pub mod health;

pub use diary::diary_routes;
pub use health::health_routes;

use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// Cookie carrying the client identifier
pub const CLIENT_COOKIE: &str = "dd_client";

/// Extract the client token from the Cookie header, if present
pub(crate) fn client_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == CLIENT_COOKIE).then(|| value.to_string())
    })
}

/// Serialize a response body, issuing the identity cookie when the
/// registry minted a fresh session for this request
pub(crate) fn session_response<T: Serialize>(created: bool, client_id: &str, body: T) -> Response {
    if created {
        let cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            CLIENT_COOKIE, client_id
        );
        ([(header::SET_COOKIE, cookie)], Json(body)).into_response()
    } else {
        Json(body).into_response()
    }
}
