use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::auth::model::{AdminUser, AuthenticatedUser};

/// Request DTO for back-office login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    #[schema(example = "admin")]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for a successful login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: AuthUserDto,
}

/// Account summary returned on login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<AdminUser> for AuthUserDto {
    fn from(u: AdminUser) -> Self {
        Self {
            id: u.id,
            username: u.username,
            created_at: u.created_at,
            last_login_at: u.last_login_at,
        }
    }
}

/// Response DTO for `GET /api/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: String,
    pub username: String,
    pub roles: Vec<String>,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(u: AuthenticatedUser) -> Self {
        Self {
            id: u.sub,
            username: u.username,
            roles: u.roles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_dto_keeps_timestamps_and_drops_hash() {
        let created_at = Utc::now();
        let user = AdminUser {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            is_active: true,
            created_at,
            last_login_at: None,
        };

        let dto = AuthUserDto::from(user);
        assert_eq!(dto.created_at, created_at);
        assert!(dto.last_login_at.is_none());

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("created_at").is_some());
        assert!(json.get("password_hash").is_none());
    }
}
