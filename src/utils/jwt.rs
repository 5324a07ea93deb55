use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Role, User};

/// JWT claims identifying the bearer.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub username: String,
    /// Role at issue time; the auth middleware re-reads the stored role
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user valid for `expiration_hours`.
    pub fn for_user(user: &User, expiration_hours: i64) -> Self {
        let now = jiff::Timestamp::now().as_second();

        Self {
            sub: user.id.to_string(),
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role,
            iat: now,
            exp: now + expiration_hours * 3600,
        }
    }

    /// Parses the subject back into a user ID.
    pub fn user_id(&self) -> AppResult<Uuid> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }
}

/// Signs a token for `user`.
///
/// # Arguments
/// * `user` - The authenticated user
/// * `secret` - The secret key for signing the token
/// * `expiration_hours` - Token validity duration in hours
pub fn generate_token(user: &User, secret: &str, expiration_hours: i64) -> AppResult<String> {
    encode_claims(&Claims::for_user(user, expiration_hours), secret)
}

fn encode_claims(claims: &Claims, secret: &str) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {}", e),
    })
}

/// Verifies signature and expiry and returns the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::unauthorized("Token has expired")
        }
        jsonwebtoken::errors::ErrorKind::InvalidSignature => {
            AppError::unauthorized("Invalid token signature")
        }
        _ => AppError::unauthorized("Invalid token"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test_secret_key_for_jwt_testing_0123456789";

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            created_at: jiff::Timestamp::now().into(),
        }
    }

    #[test]
    fn test_token_subject_resolves_to_same_user() {
        let user = user();
        let token = generate_token(&user, TEST_SECRET, 24).unwrap();

        let claims = validate_token(&token, TEST_SECRET).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_token(&user(), TEST_SECRET, 1).unwrap();

        let result = validate_token(&token, "another_secret_key_that_is_long_enough");
        assert!(matches!(result, Err(AppError::Unauthorized { message }) if message == "Invalid token signature"));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut claims = Claims::for_user(&user(), 1);
        claims.iat -= 7200;
        claims.exp -= 7200;
        let token = encode_claims(&claims, TEST_SECRET).unwrap();

        let result = validate_token(&token, TEST_SECRET);
        assert!(matches!(result, Err(AppError::Unauthorized { message }) if message == "Token has expired"));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let result = validate_token("not.a.token", TEST_SECRET);
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }

    #[test]
    fn test_non_uuid_subject_is_unauthorized() {
        let mut claims = Claims::for_user(&user(), 1);
        claims.sub = "42".to_string();
        assert!(matches!(claims.user_id(), Err(AppError::Unauthorized { .. })));
    }
}
