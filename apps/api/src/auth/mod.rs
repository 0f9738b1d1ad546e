//! Bearer-credential gate wrapping every protected endpoint.
//!
//! Per-request flow: extract the bearer token → verify HS256 signature and
//! expiry → resolve the subject claim to a `users` row → (optionally) check
//! the stored role. Each step fails with its own error kind so callers can
//! tell a missing credential from an expired or tampered one, and an
//! unknown subject from a role mismatch. The gate performs no writes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::debug;

use crate::errors::AppError;
use crate::models::user::Caller;
use crate::state::AppState;

/// Claims carried by access tokens issued by the account service.
///
/// `sub` is the caller's email address. Tokens also carry a `role` claim for
/// client-side display; authorization always uses the role stored in the
/// identity store, never the claim.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
/// Anything other than a well-formed Bearer header counts as an absent
/// credential.
fn extract_bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AppError::Unauthenticated)?;

    let value = header.to_str().map_err(|_| AppError::Unauthenticated)?;

    value.strip_prefix("Bearer ").ok_or(AppError::Unauthenticated)
}

/// Verifies signature and expiry of a bearer token.
///
/// Expiry and signature failures are distinct, observable kinds: an expired
/// but well-signed token is `TokenExpired`, every other decode failure is
/// `TokenInvalid`.
pub fn verify_bearer_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::TokenInvalid,
    })?;

    Ok(token_data.claims)
}

/// Resolves a token subject to a durable caller identity.
pub async fn find_caller_by_subject(
    pool: &PgPool,
    subject: &str,
) -> Result<Option<Caller>, sqlx::Error> {
    sqlx::query_as::<_, Caller>("SELECT id, email, role, created_at FROM users WHERE email = $1")
        .bind(subject)
        .fetch_optional(pool)
        .await
}

/// Authenticated caller extractor for protected handlers.
///
/// Runs the full gate before the handler body executes, so a rejected
/// request performs no rendering, inference, or persistence work.
pub struct AuthenticatedCaller(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let claims = verify_bearer_token(token, &state.config.jwt_secret)?;

        let caller = find_caller_by_subject(&state.db, &claims.sub)
            .await?
            .ok_or(AppError::UnknownCaller)?;

        debug!(caller = %caller.email, role = %caller.role, "caller authenticated");

        Ok(AuthenticatedCaller(caller))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn make_token(sub: &str, role: Option<&str>, exp: i64, secret: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            role: role.map(String::from),
            exp: exp as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/scans");
        if let Some(v) = value {
            builder = builder.header(axum::http::header::AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_valid_token_round_trips_claims() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = make_token("a@x.com", Some("user"), exp, SECRET);

        let claims = verify_bearer_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.role.as_deref(), Some("user"));
    }

    #[test]
    fn test_expired_token_is_token_expired_not_unauthenticated() {
        // Past the default 60s leeway.
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = make_token("a@x.com", Some("user"), exp, SECRET);

        let err = verify_bearer_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_is_token_invalid() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = make_token("a@x.com", None, exp, "other-secret");

        let err = verify_bearer_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::TokenInvalid));
    }

    #[test]
    fn test_garbage_token_is_token_invalid() {
        let err = verify_bearer_token("not.a.jwt", SECRET).unwrap_err();
        assert!(matches!(err, AppError::TokenInvalid));
    }

    #[test]
    fn test_token_without_expiry_is_rejected() {
        // Hand-build a claims object with no exp field at all.
        #[derive(Serialize)]
        struct NoExp {
            sub: String,
        }
        let token = encode(
            &Header::default(),
            &NoExp {
                sub: "a@x.com".to_string(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verify_bearer_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AppError::TokenInvalid));
    }

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let parts = parts_with_auth(None);
        let err = extract_bearer_token(&parts).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[test]
    fn test_non_bearer_scheme_is_unauthenticated() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        let err = extract_bearer_token(&parts).unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[test]
    fn test_bearer_token_is_extracted_verbatim() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&parts).unwrap(), "abc.def.ghi");
    }
}
