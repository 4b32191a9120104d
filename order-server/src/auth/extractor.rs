//! Identity Extractor
//!
//! Reads the caller identity forwarded by the session layer.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::UserRole;

use super::{CurrentUser, USER_ID_HEADER, USER_ROLE_HEADER};
use crate::utils::{AppError, ErrorCode};

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Check if already extracted
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(*user);
        }

        let user_id = header_value(parts, USER_ID_HEADER)?;
        let role = header_value(parts, USER_ROLE_HEADER)?;

        let user_id: i64 = user_id.parse().map_err(|_| {
            crate::security_log!("WARN", "identity_invalid", uri = parts.uri.to_string());
            AppError::with_message(ErrorCode::InvalidIdentity, format!("Invalid {USER_ID_HEADER}"))
        })?;
        let role: UserRole = role.parse().map_err(|e| {
            crate::security_log!("WARN", "identity_invalid", uri = parts.uri.to_string());
            AppError::with_message(ErrorCode::InvalidIdentity, format!("{e}"))
        })?;

        let user = CurrentUser::new(user_id, role);
        parts.extensions.insert(user);
        Ok(user)
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    match parts.headers.get(name).map(|h| h.to_str()) {
        Some(Ok(value)) if !value.trim().is_empty() => Ok(value.trim()),
        Some(_) => Err(AppError::with_message(
            ErrorCode::InvalidIdentity,
            format!("Invalid {name}"),
        )),
        None => {
            crate::security_log!("WARN", "identity_missing", uri = parts.uri.to_string());
            Err(AppError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(headers: &[(&str, &str)]) -> Result<CurrentUser, AppError> {
        let mut builder = Request::builder().uri("/orders/1");
        for (k, v) in headers {
            builder = builder.header(*k, *v);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_identity() {
        let user = extract(&[(USER_ID_HEADER, "42"), (USER_ROLE_HEADER, "VENDOR")])
            .await
            .unwrap();
        assert_eq!(user, CurrentUser::new(42, UserRole::Vendor));
    }

    #[tokio::test]
    async fn test_missing_identity_is_unauthorized() {
        let err = extract(&[(USER_ROLE_HEADER, "ADMIN")]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
        let err = extract(&[(USER_ID_HEADER, "1")]).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotAuthenticated);
    }

    #[tokio::test]
    async fn test_malformed_identity_is_rejected() {
        let err = extract(&[(USER_ID_HEADER, "abc"), (USER_ROLE_HEADER, "ADMIN")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIdentity);

        let err = extract(&[(USER_ID_HEADER, "1"), (USER_ROLE_HEADER, "CHEF")])
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIdentity);
        assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
    }
}
