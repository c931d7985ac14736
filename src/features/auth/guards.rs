//! Role-based authorization guards.
//!
//! Guards read the `AuthenticatedUser` stored by the auth middleware and
//! reject the request when the required role is missing.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for back-office endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(user: Option<AuthenticatedUser>) -> Parts {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "0191f1a2-0000-7000-8000-000000000001".to_string(),
            username: "agent".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_require_admin() {
        let mut parts = parts_with(Some(user(&["admin"])));
        assert!(RequireAdmin::from_request_parts(&mut parts, &()).await.is_ok());

        let mut parts = parts_with(Some(user(&[])));
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut parts, &()).await,
            Err(AppError::Forbidden(_))
        ));

        let mut parts = parts_with(None);
        assert!(matches!(
            RequireAdmin::from_request_parts(&mut parts, &()).await,
            Err(AppError::Unauthorized(_))
        ));
    }
}
