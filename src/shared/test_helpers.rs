#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::shared::constants::ROLE_ADMIN;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
#[allow(dead_code)]
pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "test-admin-id".to_string(),
        username: "test-admin".to_string(),
        roles: vec![ROLE_ADMIN.to_string()],
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub fn create_staff_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "test-staff-id".to_string(),
        username: "test-staff".to_string(),
        roles: vec![],
    }
}

#[cfg(test)]
#[allow(dead_code)]
async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

#[cfg(test)]
#[allow(dead_code)]
async fn inject_staff_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_staff_user());
    next.run(request).await
}

/// Wraps a router so every request arrives as the test admin
#[cfg(test)]
#[allow(dead_code)]
pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}

/// Authenticated, but without the admin role
#[cfg(test)]
#[allow(dead_code)]
pub fn with_staff_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_staff_middleware))
}

/// Pool that never connects; for handlers that must fail before touching the database
#[cfg(test)]
#[allow(dead_code)]
pub fn lazy_pool() -> sqlx::PgPool {
    sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/multicasa_test")
        .expect("lazy pool")
}
