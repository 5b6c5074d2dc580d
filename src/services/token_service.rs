use crate::utils::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access-token payload: subject id + email, 5-hour validity.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    pub id: String,
    pub email: String,
    pub exp: usize,
}

/// Refresh-token payload: email only, 7-day validity. Validity is checked by
/// signature + expiry alone; there is no persisted blacklist.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub email: String,
    pub exp: usize,
}

fn access_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|_| "default-secret-change-me".to_string())
}

fn refresh_secret() -> String {
    std::env::var("JWT_REFRESH_TOKEN")
        .unwrap_or_else(|_| "default-refresh-secret-change-me".to_string())
}

pub fn generate_access_token(user_id: &str, email: &str) -> Result<String, AppError> {
    let claims = AccessClaims {
        id: user_id.to_string(),
        email: email.to_string(),
        exp: (Utc::now() + Duration::hours(5)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(access_secret().as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
}

pub fn generate_refresh_token(email: &str) -> Result<String, AppError> {
    let claims = RefreshClaims {
        email: email.to_string(),
        exp: (Utc::now() + Duration::days(7)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(refresh_secret().as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to generate refresh token: {}", e)))
}

pub fn verify_access_token(token: &str) -> Result<AccessClaims, AppError> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(access_secret().as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Signature + expiry check only, used to decide whether the stored refresh
/// token can be reused at login.
pub fn is_refresh_token_valid(token: &str) -> bool {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(refresh_secret().as_ref()),
        &Validation::default(),
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_test_secrets() {
        std::env::set_var("JWT_SECRET", "test-access-secret");
        std::env::set_var("JWT_REFRESH_TOKEN", "test-refresh-secret");
    }

    #[test]
    fn test_access_token_round_trip() {
        set_test_secrets();

        let token = generate_access_token("64f0c2a7e13d5a0001a1b2c3", "a@b.com").unwrap();
        let claims = verify_access_token(&token).unwrap();

        assert_eq!(claims.id, "64f0c2a7e13d5a0001a1b2c3");
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_tampered_access_token_is_rejected() {
        set_test_secrets();

        let token = generate_access_token("someid", "a@b.com").unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

        assert!(verify_access_token(&tampered).is_err());
    }

    #[test]
    fn test_expired_access_token_is_rejected() {
        set_test_secrets();

        let claims = AccessClaims {
            id: "someid".to_string(),
            email: "a@b.com".to_string(),
            // Past the default 60s leeway
            exp: (Utc::now() - Duration::minutes(5)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(access_secret().as_ref()),
        )
        .unwrap();

        assert!(verify_access_token(&token).is_err());
    }

    #[test]
    fn test_refresh_token_validity() {
        set_test_secrets();

        let token = generate_refresh_token("a@b.com").unwrap();
        assert!(is_refresh_token_valid(&token));
        assert!(!is_refresh_token_valid("not.a.jwt"));
    }

    #[test]
    fn test_refresh_token_not_valid_as_access_token() {
        set_test_secrets();

        let refresh = generate_refresh_token("a@b.com").unwrap();
        assert!(verify_access_token(&refresh).is_err());
    }
}
