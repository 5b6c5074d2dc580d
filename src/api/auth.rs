use crate::{
    database::MongoDB,
    models::User,
    services::{email_service, token_service, user_service},
    utils::{codes, error::AppError},
};
use actix_web::{web, HttpResponse};
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::json;

const MIN_PASSWORD_LENGTH: usize = 6;
const CODE_LENGTH: usize = 4;

/// Minimal address shape check: one `@` with a dotted, non-empty domain.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

pub(crate) fn validate_email(email: &str) -> Result<(), AppError> {
    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn validate_code(code: &str) -> Result<(), AppError> {
    if code.len() != CODE_LENGTH {
        return Err(AppError::Validation(format!(
            "Code must be {} characters",
            CODE_LENGTH
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "phoneNo", default)]
    pub phone_no: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CodeRequest {
    pub code: String,
}

impl CodeRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_code(&self.code)
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

impl EmailRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    pub code: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

impl ResetPasswordRequest {
    fn validate(&self) -> Result<(), AppError> {
        validate_code(&self.code)?;
        validate_password(&self.new_password)
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful"),
        (status = 400, description = "Invalid request or email already registered")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("📝 POST /api/auth/register - email: {}", request.email);
    request.validate()?;

    if user_service::find_user_by_email(&db, &request.email)
        .await?
        .is_some()
    {
        return Err(AppError::Validation("Email already exist".to_string()));
    }

    let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)?;
    let one_time_code = codes::generate_code();
    let email = request.email.to_lowercase();
    let refresh_token = token_service::generate_refresh_token(&email)?;

    let now = mongodb::bson::DateTime::now();
    let user = User {
        id: None,
        name: request.name.clone(),
        email,
        image: request.image.clone(),
        password: Some(password_hash),
        role: "user".to_string(),
        location: request.location.clone(),
        phone_no: request.phone_no.clone(),
        google_user_id: None,
        refresh_token,
        verified: false,
        verification_code: one_time_code.code.clone(),
        verification_code_expires: one_time_code.expires_at,
        reset_password_code: None,
        reset_password_code_expires_in: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    let user = user_service::create_user(&db, user).await?;

    // A failed send must not lose the account; the code can be resent
    if let Err(e) =
        email_service::send_verification_code(&user.email, &user.name, &one_time_code.code).await
    {
        log::warn!("⚠️ Verification email not sent to {}: {}", user.email, e);
    }

    let token = token_service::generate_access_token(&user.id_hex(), &user.email)?;

    log::info!("✅ User registered: {}", user.email);

    Ok(HttpResponse::Created().json(json!({
        "message": "Registration was successful. Please check your email for the verification code.",
        "data": { "user": user.to_public(), "token": token },
        "success": true
    })))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 404, description = "Invalid credentials")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /api/auth/login - email: {}", request.email);
    request.validate()?;

    // Unknown email and wrong password are indistinguishable to the caller
    let user = user_service::find_user_by_email(&db, &request.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid Credentials".to_string()))?;

    let password_hash = user
        .password
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Invalid Credentials".to_string()))?;

    if !bcrypt::verify(&request.password, password_hash)? {
        log::warn!("❌ Login failed: {}", request.email);
        return Err(AppError::NotFound("Invalid Credentials".to_string()));
    }

    let token = token_service::generate_access_token(&user.id_hex(), &user.email)?;

    // Reuse the stored refresh token while it still verifies, otherwise rotate
    let user = if token_service::is_refresh_token_valid(&user.refresh_token) {
        user
    } else {
        let refresh_token = token_service::generate_refresh_token(&user.email)?;
        user_service::update_user(
            &db,
            &user.id_hex(),
            doc! { "refreshToken": &refresh_token },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid Credentials".to_string()))?
    };

    log::info!("✅ Login successful: {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "data": login_payload(&user, &token),
        "success": true
    })))
}

/// Login response data. The refresh credential rides alongside the sanitized
/// user because `PublicUser` deliberately strips it.
fn login_payload(user: &User, token: &str) -> serde_json::Value {
    json!({
        "user": user.to_public(),
        "token": token,
        "refreshToken": user.refresh_token,
    })
}

pub async fn verify_email_code(
    db: web::Data<MongoDB>,
    request: web::Json<CodeRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("✉️ POST /api/auth/verify_email_code");
    request.validate()?;

    let user = user_service::find_user_by_verification_code(&db, &request.code)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if user.verification_code != request.code {
        return Err(AppError::Validation(
            "Invalid verification code".to_string(),
        ));
    }

    if user.verification_code_expires.to_chrono() < chrono::Utc::now() {
        return Err(AppError::Validation(
            "Verification code has expired".to_string(),
        ));
    }

    user_service::update_user(&db, &user.id_hex(), doc! { "verified": true }).await?;

    log::info!("✅ Email verified: {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Email verified successfully",
        "data": {},
        "success": true
    })))
}

pub async fn forgot_password(
    db: web::Data<MongoDB>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔑 PATCH /api/auth/forgot_password - email: {}", request.email);
    request.validate()?;

    let user = user_service::find_user_by_email(&db, &request.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let one_time_code = codes::generate_code();

    if let Err(e) =
        email_service::send_forgot_password_email(&user.email, &user.name, &one_time_code.code)
            .await
    {
        log::warn!("⚠️ Password reset email not sent to {}: {}", user.email, e);
    }

    user_service::update_user(
        &db,
        &user.id_hex(),
        doc! {
            "resetPasswordCode": &one_time_code.code,
            "resetPasswordCodeExpiresIn": one_time_code.expires_at,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset code sent to your email",
        "data": {},
        "success": true
    })))
}

pub async fn verify_reset_code(
    db: web::Data<MongoDB>,
    request: web::Json<CodeRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔍 POST /api/auth/verify_reset_code");
    request.validate()?;

    let user = user_service::find_user_by_reset_code(&db, &request.code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid reset code".to_string()))?;

    let expires = user
        .reset_password_code_expires_in
        .ok_or_else(|| AppError::Validation("Reset code has expired".to_string()))?;

    if expires.to_chrono() < chrono::Utc::now() {
        return Err(AppError::Validation("Reset code has expired".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Reset code verified",
        "data": {},
        "success": true
    })))
}

pub async fn reset_password(
    db: web::Data<MongoDB>,
    request: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔑 PATCH /api/auth/reset_password");
    request.validate()?;

    let user = user_service::find_user_by_reset_code(&db, &request.code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid reset code".to_string()))?;

    let expires = user
        .reset_password_code_expires_in
        .ok_or_else(|| AppError::Validation("Reset code has expired".to_string()))?;

    if expires.to_chrono() < chrono::Utc::now() {
        return Err(AppError::Validation("Reset code has expired".to_string()));
    }

    let password_hash = bcrypt::hash(&request.new_password, bcrypt::DEFAULT_COST)?;

    user_service::update_user(&db, &user.id_hex(), doc! { "password": password_hash }).await?;

    log::info!("✅ Password reset: {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset successfully",
        "data": {},
        "success": true
    })))
}

pub async fn resend_verification_code(
    db: web::Data<MongoDB>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "🔄 PATCH /api/auth/resend_verification_code - email: {}",
        request.email
    );
    request.validate()?;

    let user = user_service::find_user_by_email(&db, &request.email)
        .await?
        .ok_or_else(|| AppError::Validation("User not found".to_string()))?;

    let one_time_code = codes::generate_code();

    if let Err(e) =
        email_service::send_verification_code(&user.email, &user.name, &one_time_code.code).await
    {
        log::warn!("⚠️ Verification email not sent to {}: {}", user.email, e);
    }

    user_service::update_user(
        &db,
        &user.id_hex(),
        doc! {
            "verification_code": &one_time_code.code,
            "verification_code_expires": one_time_code.expires_at,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Verification code resent",
        "data": {},
        "success": true
    })))
}

pub async fn resend_password_code(
    db: web::Data<MongoDB>,
    request: web::Json<EmailRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "🔄 PATCH /api/auth/resend_password_code - email: {}",
        request.email
    );
    request.validate()?;

    let user = user_service::find_user_by_email(&db, &request.email)
        .await?
        .ok_or_else(|| AppError::Validation("User not found".to_string()))?;

    let one_time_code = codes::generate_code();

    if let Err(e) =
        email_service::send_forgot_password_email(&user.email, &user.name, &one_time_code.code)
            .await
    {
        log::warn!("⚠️ Password reset email not sent to {}: {}", user.email, e);
    }

    user_service::update_user(
        &db,
        &user.id_hex(),
        doc! {
            "resetPasswordCode": &one_time_code.code,
            "resetPasswordCodeExpiresIn": one_time_code.expires_at,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Password reset code resent",
        "data": {},
        "success": true
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};

    fn sample_register() -> RegisterRequest {
        RegisterRequest {
            name: "Ann".to_string(),
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            image: None,
            location: None,
            phone_no: None,
        }
    }

    #[test]
    fn test_register_request_happy_path() {
        assert!(sample_register().validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_blank_name() {
        let mut request = sample_register();
        request.name = " ".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_malformed_email() {
        for email in ["not-an-email", "a@b", "@b.com", "a@.com", "a@b.com@c.com"] {
            let mut request = sample_register();
            request.email = email.to_string();
            assert!(request.validate().is_err(), "accepted {}", email);
        }
    }

    #[test]
    fn test_register_request_rejects_short_password() {
        let mut request = sample_register();
        request.password = "pw".to_string();
        request.confirm_password = "pw".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_register_request_rejects_password_mismatch() {
        let mut request = sample_register();
        request.confirm_password = "secret2".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_request_enforces_schema_rules() {
        let request = LoginRequest {
            email: "a@b.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = LoginRequest {
            email: "not-an-email".to_string(),
            password: "secret1".to_string(),
        };
        assert!(request.validate().is_err());

        let request = LoginRequest {
            email: "a@b.com".to_string(),
            password: "short".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_code_request_requires_four_characters() {
        assert!(CodeRequest {
            code: "1234".to_string()
        }
        .validate()
        .is_ok());
        assert!(CodeRequest {
            code: "123".to_string()
        }
        .validate()
        .is_err());
        assert!(CodeRequest {
            code: "12345".to_string()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_reset_request_enforces_code_and_new_password() {
        let request = ResetPasswordRequest {
            code: "1234".to_string(),
            new_password: "secret1".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = ResetPasswordRequest {
            code: "12".to_string(),
            new_password: "secret1".to_string(),
        };
        assert!(request.validate().is_err());

        let request = ResetPasswordRequest {
            code: "1234".to_string(),
            new_password: "short".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_reset_request_reads_new_password_field() {
        let request: ResetPasswordRequest =
            serde_json::from_str(r#"{"code": "1234", "newPassword": "secret1"}"#).unwrap();
        assert_eq!(request.new_password, "secret1");
    }

    #[test]
    fn test_login_payload_carries_refresh_token() {
        let user = User {
            id: Some(ObjectId::new()),
            name: "Ann".to_string(),
            email: "a@b.com".to_string(),
            image: None,
            password: Some("$2b$12$hash".to_string()),
            role: "user".to_string(),
            location: None,
            phone_no: None,
            google_user_id: None,
            refresh_token: "refresh.jwt".to_string(),
            verified: true,
            verification_code: "1234".to_string(),
            verification_code_expires: BsonDateTime::now(),
            reset_password_code: None,
            reset_password_code_expires_in: None,
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        };

        let payload = login_payload(&user, "access.jwt");
        assert_eq!(payload["refreshToken"], "refresh.jwt");
        assert_eq!(payload["token"], "access.jwt");
        // The sanitized user still hides credentials
        assert!(payload["user"].get("password").is_none());
        assert!(payload["user"].get("refreshToken").is_none());
    }
}
