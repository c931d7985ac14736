use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::model::{AuthenticatedUser, Claims};
use crate::core::error::AppError;

/// Issues and verifies the HS256 access tokens of the back office
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    leeway: u64,
    token_ttl: Duration,
}

impl JwtValidator {
    pub fn new(secret: &str, issuer: String, leeway: Duration, token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            leeway: leeway.as_secs(),
            token_ttl,
        }
    }

    /// Token lifetime in seconds, as reported to clients
    pub fn expires_in(&self) -> i64 {
        self.token_ttl.as_secs() as i64
    }

    pub fn issue_token(
        &self,
        sub: &str,
        username: &str,
        roles: Vec<String>,
    ) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            username: username.to_string(),
            roles,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.expires_in(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign access token: {:?}", e);
            AppError::Internal("Failed to sign access token".to_string())
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = self.leeway;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret";

    fn validator() -> JwtValidator {
        JwtValidator::new(
            SECRET,
            "multicasa".to_string(),
            Duration::from_secs(0),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn test_issued_token_validates() {
        let v = validator();
        let token = v
            .issue_token("user-1", "ana", vec!["admin".to_string()])
            .unwrap();

        let user = v.validate_token(&token).unwrap();
        assert_eq!(user.sub, "user-1");
        assert_eq!(user.username, "ana");
        assert!(user.is_admin());
    }

    #[test]
    fn test_rejects_other_issuer_and_secret() {
        let other_issuer = JwtValidator::new(
            SECRET,
            "someone-else".to_string(),
            Duration::from_secs(0),
            Duration::from_secs(3600),
        );
        let token = other_issuer.issue_token("user-1", "ana", vec![]).unwrap();
        assert!(matches!(
            validator().validate_token(&token),
            Err(AppError::Auth(_))
        ));

        let other_secret = JwtValidator::new(
            "another-secret-another-secret-xx",
            "multicasa".to_string(),
            Duration::from_secs(0),
            Duration::from_secs(3600),
        );
        let token = other_secret.issue_token("user-1", "ana", vec![]).unwrap();
        assert!(validator().validate_token(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let v = validator();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            username: "ana".to_string(),
            roles: vec![],
            iss: "multicasa".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(v.validate_token(&token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(validator().validate_token("not-a-jwt").is_err());
    }
}
