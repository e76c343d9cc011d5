//! Caller identity extraction.
//!
//! The auth service itself is external; the server consumes two headers:
//! `X-User-Id` identifies the caller, and an `Authorization: Bearer <key>`
//! matching the configured admin API key grants the admin capability.

use axum::http::HeaderMap;
use uuid::Uuid;

use timeline_core::types::{AuthContext, UserId};

use crate::api::errors::ApiError;

const USER_ID_HEADER: &str = "x-user-id";

/// Build the caller's auth context from request headers
pub fn auth_from_headers(
    headers: &HeaderMap,
    admin_api_key: Option<&str>,
) -> Result<AuthContext, ApiError> {
    let raw = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing X-User-Id header".to_string()))?;
    let user_id = raw
        .parse::<Uuid>()
        .map(UserId)
        .map_err(|_| ApiError::Unauthorized(format!("invalid X-User-Id header: {}", raw)))?;

    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    let is_admin = match (admin_api_key, bearer) {
        (Some(key), Some(token)) => key == token,
        _ => false,
    };

    Ok(AuthContext { user_id, is_admin })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(user: Option<&str>, bearer: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(user) = user {
            map.insert(USER_ID_HEADER, HeaderValue::from_str(user).unwrap());
        }
        if let Some(bearer) = bearer {
            map.insert(
                axum::http::header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", bearer)).unwrap(),
            );
        }
        map
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        let err = auth_from_headers(&headers(None, None), Some("key")).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn malformed_identity_is_unauthorized() {
        let err = auth_from_headers(&headers(Some("not-a-uuid"), None), None).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn matching_bearer_key_grants_admin() {
        let user = Uuid::new_v4().to_string();

        let auth = auth_from_headers(&headers(Some(&user), Some("key")), Some("key")).unwrap();
        assert!(auth.is_admin);

        let auth = auth_from_headers(&headers(Some(&user), Some("wrong")), Some("key")).unwrap();
        assert!(!auth.is_admin);

        // No key configured: nobody is admin.
        let auth = auth_from_headers(&headers(Some(&user), Some("key")), None).unwrap();
        assert!(!auth.is_admin);
    }
}
