//! Session handling
//!
//! Sessions are JWTs (HS256, keyed by `SECRET_KEY`) carried in the
//! `tr_session` cookie: HttpOnly, SameSite=Lax, 30-minute sliding expiry.
//! The [`SessionUser`] extractor validates the cookie; the
//! [`sliding_refresh`] middleware re-issues it on every authenticated
//! response so active users never hit the expiry.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

pub const SESSION_COOKIE: &str = "tr_session";

/// JWT claims carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Telegram user id
    pub sub: i64,
    /// Display name captured at verification time
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct SessionService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    minutes: i64,
}

impl SessionService {
    pub fn new(secret: &str, minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            minutes,
        }
    }

    pub fn issue(&self, user_id: i64, name: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            name: name.to_string(),
            iat: now,
            exp: now + self.minutes * 60,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::SessionExpired,
                _ => AppError::Unauthorized,
            })
    }

    /// `Set-Cookie` value for a freshly issued token.
    pub fn cookie_value(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.minutes * 60
        )
    }
}

/// Pull the session token out of the `Cookie` header.
fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

/// Authenticated session user, extracted from the cookie.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: i64,
    pub name: String,
}

impl FromRequestParts<ServerState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<SessionUser>() {
            return Ok(user.clone());
        }
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = state.sessions.verify(token)?;
        let user = SessionUser {
            user_id: claims.sub,
            name: claims.name,
        };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Sliding renewal: any request arriving with a valid session leaves with a
/// fresh cookie. Requests without a session pass through untouched.
pub async fn sliding_refresh(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let claims = session_token(request.headers())
        .and_then(|token| state.sessions.verify(token).ok());

    let mut response = next.run(request).await;

    if let Some(claims) = claims {
        if let Ok(token) = state.sessions.issue(claims.sub, &claims.name) {
            if let Ok(value) = HeaderValue::from_str(&state.sessions.cookie_value(&token)) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new("a-test-secret-key-at-least-32-bytes!", 30)
    }

    #[test]
    fn issued_token_round_trips() {
        let sessions = service();
        let token = sessions.issue(42, "sara").expect("issue");
        let claims = sessions.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.name, "sara");
        assert!(claims.exp - claims.iat == 30 * 60);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = service().issue(42, "sara").expect("issue");
        let other = SessionService::new("another-secret-key-also-32-bytes!!!!", 30);
        assert!(matches!(
            other.verify(&token),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn cookie_header_parsing_finds_the_session() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; tr_session=abc.def.ghi; lang=ar"),
        );
        assert_eq!(session_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn cookie_value_carries_the_attributes() {
        let value = service().cookie_value("tok");
        assert!(value.starts_with("tr_session=tok;"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Lax"));
        assert!(value.contains("Max-Age=1800"));
    }
}
