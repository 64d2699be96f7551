use super::error::ApiError;
use super::state::ServerState;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

/// A verified bearer session. Extracting one from a request fails with 401
/// when no token is presented and 403 when the token does not verify.
#[derive(Debug)]
pub struct Session {
    pub username: String,
    pub token: String,
}

pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?;
    let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
    // Accept both "Bearer <token>" and a bare token.
    Some(
        value
            .strip_prefix("Bearer ")
            .map(|s| s.to_string())
            .unwrap_or(value),
    )
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts).ok_or(ApiError::MissingToken)?;
        match ctx.admin_auth.verify_token(&token) {
            Ok(username) => Ok(Session { username, token }),
            Err(err) => {
                debug!("Rejecting session token: {}", err);
                Err(ApiError::InvalidToken)
            }
        }
    }
}
