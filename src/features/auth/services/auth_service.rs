use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto};
use crate::features::auth::model::AdminUser;
use crate::features::auth::JwtValidator;
use crate::shared::constants::ROLE_ADMIN;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Hash a plaintext password with Argon2id and a random salt (PHC string)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// `Ok(false)` on mismatch; `Err` only for an unreadable stored hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

/// Service for back-office authentication
pub struct AuthService {
    pool: PgPool,
    jwt: Arc<JwtValidator>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtValidator>) -> Self {
        Self { pool, jwt }
    }

    /// Login with username and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let user = sqlx::query_as::<_, AdminUser>(
            r#"
            SELECT id, username, password_hash, is_active, created_at, last_login_at
            FROM admin_users
            WHERE username = $1
            "#,
        )
        .bind(dto.username.trim())
        .fetch_optional(&self.pool)
        .await?;

        // Unknown user, inactive account and wrong password all look the same
        let user = match user {
            Some(u) if u.is_active => u,
            _ => {
                tracing::info!("Rejected login for '{}'", dto.username);
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };
        if !verify_password(&dto.password, &user.password_hash)? {
            tracing::info!("Rejected login for '{}'", dto.username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let user = sqlx::query_as::<_, AdminUser>(
            r#"
            UPDATE admin_users SET last_login_at = NOW()
            WHERE id = $1
            RETURNING id, username, password_hash, is_active, created_at, last_login_at
            "#,
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;

        let access_token = self.jwt.issue_token(
            &user.id.to_string(),
            &user.username,
            vec![ROLE_ADMIN.to_string()],
        )?;

        tracing::info!("Admin '{}' logged in", user.username);

        Ok(AuthResponseDto {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expires_in(),
            user: user.into(),
        })
    }

    /// Create the configured admin account when it does not exist yet.
    ///
    /// Returns whether an account was created.
    pub async fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> Result<bool> {
        let password_hash = hash_password(password)?;

        let result = sqlx::query(
            r#"
            INSERT INTO admin_users (id, username, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(username)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse-battery-staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }

    fn service(pool: PgPool) -> AuthService {
        AuthService::new(
            pool,
            Arc::new(JwtValidator::new(
                "test-secret-test-secret-test-secret",
                "multicasa".to_string(),
                Duration::from_secs(0),
                Duration::from_secs(3600),
            )),
        )
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_bootstrap_then_login(pool: PgPool) {
        let svc = service(pool);
        assert!(svc.ensure_bootstrap_admin("admin", "s3cret-pass").await.unwrap());
        assert!(!svc.ensure_bootstrap_admin("admin", "other").await.unwrap());

        let response = svc
            .login(LoginRequestDto {
                username: "admin".to_string(),
                password: "s3cret-pass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert!(response.user.last_login_at.is_some());
        assert!(response.user.last_login_at >= Some(response.user.created_at));

        let wrong = svc
            .login(LoginRequestDto {
                username: "admin".to_string(),
                password: "other".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
    }
}
