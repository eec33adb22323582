//! Authentication extractors and session-cookie plumbing.
//!
//! The session credential travels as an HTTP-only cookie holding the signed
//! token. The extractors verify it against the process-wide signing secret;
//! nothing is looked up server-side.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::error::AppError;
use crate::services::token::{TOKEN_TTL_SECS, TokenClaims};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Pull the raw session token out of request headers, if present.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE_NAME).then(|| value.to_owned())
        })
}

/// Build the `Set-Cookie` value that establishes a session.
///
/// HTTP-only, `SameSite=Lax`, max-age matching the token expiry, and
/// `Secure` on HTTPS deployments.
#[must_use]
pub fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={TOKEN_TTL_SECS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the `Set-Cookie` value that clears the session (logout).
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extractor that requires a verified session credential.
///
/// Rejects with 401 when the cookie is absent, malformed, forged, or expired.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(claims): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", claims.email)
/// }
/// ```
pub struct CurrentUser(pub TokenClaims);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AppError::Unauthenticated)?;

        let claims = state
            .tokens()
            .verify(&token)
            .map_err(|_| AppError::Unauthenticated)?;

        Ok(Self(claims))
    }
}

/// Extractor that optionally yields the verified session credential.
///
/// Unlike `CurrentUser`, this never rejects; an absent or invalid cookie
/// yields `None`.
pub struct OptionalUser(pub Option<TokenClaims>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims =
            token_from_headers(&parts.headers).and_then(|t| state.tokens().verify(&t).ok());

        Ok(Self(claims))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_from_headers_single_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=abc123"));

        assert_eq!(token_from_headers(&headers), Some("abc123".to_owned()));
    }

    #[test]
    fn test_token_from_headers_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc123; lang=en"),
        );

        assert_eq!(token_from_headers(&headers), Some("abc123".to_owned()));
    }

    #[test]
    fn test_token_from_headers_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));

        assert_eq!(token_from_headers(&headers), None);
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie("abc", false);
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(!cookie.contains("Secure"));

        let secure = session_cookie("abc", true);
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie_expires_immediately() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("token=;"));
    }
}
