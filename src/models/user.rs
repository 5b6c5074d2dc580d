use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

fn default_role() -> String {
    "user".to_string()
}

/// Persisted user record. Field names match the MongoDB documents.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// None for social-auth accounts, bcrypt hash otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "phoneNo", skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    #[serde(rename = "googleUserId", skip_serializing_if = "Option::is_none")]
    pub google_user_id: Option<String>,
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    #[serde(default)]
    pub verified: bool,
    pub verification_code: String,
    pub verification_code_expires: BsonDateTime,
    #[serde(rename = "resetPasswordCode", skip_serializing_if = "Option::is_none")]
    pub reset_password_code: Option<String>,
    #[serde(
        rename = "resetPasswordCodeExpiresIn",
        skip_serializing_if = "Option::is_none"
    )]
    pub reset_password_code_expires_in: Option<BsonDateTime>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

/// The single sanitized projection of a user returned by any endpoint.
/// Password, refresh token, one-time codes, role and the social-auth id are
/// stripped here and nowhere else, so a new call site cannot forget them.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "phoneNo", skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    pub verified: bool,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id_hex(),
            name: self.name.clone(),
            email: self.email.clone(),
            image: self.image.clone().unwrap_or_default(),
            location: self.location.clone(),
            phone_no: self.phone_no.clone(),
            verified: self.verified,
            created_at: self.created_at.map(|dt| dt.to_chrono()),
            updated_at: self.updated_at.map(|dt| dt.to_chrono()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Some(ObjectId::new()),
            name: "Ann".to_string(),
            email: "a@b.com".to_string(),
            image: None,
            password: Some("$2b$12$hash".to_string()),
            role: "user".to_string(),
            location: Some("London".to_string()),
            phone_no: None,
            google_user_id: Some("google-123".to_string()),
            refresh_token: "refresh.jwt".to_string(),
            verified: false,
            verification_code: "1234".to_string(),
            verification_code_expires: BsonDateTime::now(),
            reset_password_code: Some("5678".to_string()),
            reset_password_code_expires_in: Some(BsonDateTime::now()),
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        }
    }

    #[test]
    fn test_public_projection_strips_sensitive_fields() {
        let user = sample_user();
        let json = serde_json::to_value(user.to_public()).unwrap();

        assert!(json.get("password").is_none());
        assert!(json.get("refreshToken").is_none());
        assert!(json.get("verification_code").is_none());
        assert!(json.get("verification_code_expires").is_none());
        assert!(json.get("resetPasswordCode").is_none());
        assert!(json.get("resetPasswordCodeExpiresIn").is_none());
        assert!(json.get("role").is_none());
        assert!(json.get("googleUserId").is_none());
        assert!(json.get("_id").is_none());
    }

    #[test]
    fn test_public_projection_keeps_identity_fields() {
        let user = sample_user();
        let public = user.to_public();

        assert_eq!(public.id, user.id.unwrap().to_hex());
        assert_eq!(public.email, "a@b.com");
        assert_eq!(public.image, "");
        assert!(!public.verified);
    }
}
