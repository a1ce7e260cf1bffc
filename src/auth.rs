//! Password login and bearer-token sessions for the admin API.

use axum::http::{HeaderMap, header};
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::Admin;

fn invalid_credentials() -> AppError {
    // Same message for unknown email and wrong password.
    AppError::Unauthorized("invalid email or password".to_string())
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))
}

/// Resolves the request's bearer token to a live admin session. Every admin
/// handler calls this before touching storage.
pub async fn require_admin(pool: &SqlitePool, headers: &HeaderMap) -> Result<Admin, AppError> {
    let token = bearer_token(headers)?;
    db::find_live_session(pool, token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("session expired or unknown".to_string()))
}

pub async fn login(pool: &SqlitePool, email: &str, password: &str) -> Result<String, AppError> {
    let admin = db::find_admin_by_email(pool, email)
        .await?
        .ok_or_else(invalid_credentials)?;
    if !bcrypt::verify(password, &admin.password_hash)? {
        return Err(invalid_credentials());
    }
    db::create_session(pool, admin.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_parses_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc123");
    }

    #[test]
    fn bearer_token_rejects_missing_or_malformed_header() {
        let headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&basic).is_err());

        let mut empty = HeaderMap::new();
        empty.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&empty).is_err());
    }
}
