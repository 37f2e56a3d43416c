//! Bearer-token authentication.
//!
//! The core treats credential verification as a black box: the
//! `TokenVerifier` yields an identity or fails, and only the identity
//! (its email) flows into the domain as `created_by`. The bundled
//! verifier mocks the upstream Microsoft exchange; swapping in a real
//! Entra ID verifier only touches this module.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

use clientdesk_core::{AuthIdentity, Error, Result, TokenExchangeResponse, TokenVerifier};

use crate::error::ApiError;
use crate::AppState;

/// Mock upstream-auth provider.
///
/// Exchanges a known upstream token for a session token, and verifies
/// that session token on subsequent requests.
#[derive(Debug, Clone)]
pub struct MockMicrosoftAuth {
    session_token: String,
    upstream_token: String,
    identity: AuthIdentity,
}

impl MockMicrosoftAuth {
    pub fn new(session_token: String, upstream_token: String) -> Self {
        Self {
            session_token,
            upstream_token,
            identity: AuthIdentity {
                subject: "mock-user-id".to_string(),
                email: "user@company.com".to_string(),
                name: "Mock User".to_string(),
            },
        }
    }

    /// Exchange an upstream token for a session token.
    pub fn exchange(&self, upstream: &str) -> Result<TokenExchangeResponse> {
        if upstream == self.upstream_token {
            Ok(TokenExchangeResponse {
                access_token: self.session_token.clone(),
                user: self.identity.clone(),
            })
        } else {
            Err(Error::Unauthorized("Invalid Microsoft token".to_string()))
        }
    }
}

#[async_trait]
impl TokenVerifier for MockMicrosoftAuth {
    async fn verify(&self, token: &str) -> Result<AuthIdentity> {
        if token == self.session_token {
            Ok(self.identity.clone())
        } else {
            Err(Error::Unauthorized(
                "Invalid authentication credentials".to_string(),
            ))
        }
    }
}

/// Pull the bearer token out of an Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor that requires a valid bearer token.
///
/// Usage:
/// ```ignore
/// async fn my_handler(auth: RequireAuth) -> impl IntoResponse {
///     // auth.identity.email stamps created_by
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub identity: AuthIdentity,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            ApiError::Unauthorized("Authentication required".to_string())
        })?;

        let identity = state.auth.verify(token).await.map_err(ApiError::from)?;
        Ok(RequireAuth { identity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn provider() -> MockMicrosoftAuth {
        MockMicrosoftAuth::new("session-abc".to_string(), "upstream-xyz".to_string())
    }

    #[tokio::test]
    async fn test_verify_accepts_session_token() {
        let identity = provider().verify("session-abc").await.expect("valid");
        assert_eq!(identity.email, "user@company.com");
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_token() {
        let err = provider().verify("garbage").await.expect_err("invalid");
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[test]
    fn test_exchange_round_trip() {
        let auth = provider();
        let resp = auth.exchange("upstream-xyz").expect("valid upstream");
        assert_eq!(resp.access_token, "session-abc");
        assert!(auth.exchange("wrong").is_err());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
