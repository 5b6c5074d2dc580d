use crate::{
    database::MongoDB,
    middleware::auth::AuthenticatedUser,
    services::user_service,
    utils::error::AppError,
};
use actix_web::{web, HttpResponse};
use mongodb::bson::{doc, Document};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "phoneNo", default)]
    pub phone_no: Option<String>,
}

impl UpdateUserRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.is_none()
            && self.email.is_none()
            && self.location.is_none()
            && self.phone_no.is_none()
        {
            return Err(AppError::Validation(
                "At least one field is required".to_string(),
            ));
        }
        if let Some(email) = &self.email {
            crate::api::auth::validate_email(email)?;
        }
        Ok(())
    }

    fn to_document(&self) -> Document {
        let mut fields = doc! {};
        if let Some(name) = &self.name {
            fields.insert("name", name);
        }
        if let Some(email) = &self.email {
            // Stored lowercased, like registration
            fields.insert("email", email.to_lowercase());
        }
        if let Some(location) = &self.location {
            fields.insert("location", location);
        }
        if let Some(phone_no) = &self.phone_no {
            fields.insert("phoneNo", phone_no);
        }
        fields
    }
}

pub async fn get_all_users(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    log::info!("👥 GET /api/users");

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Users fetched successfully",
            "data": [],
            "success": true
        })));
    }

    let users = user_service::find_all_users(&db).await?;
    let users: Vec<_> = users.iter().map(|user| user.to_public()).collect();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Users fetched successfully",
        "data": users,
        "success": true
    })))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    responses(
        (status = 200, description = "User found", body = crate::models::PublicUser),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("👤 GET /api/users/{}", id);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "User fetched successfully",
            "data": {},
            "success": true
        })));
    }

    let user = user_service::find_user_by_id(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "User fetched successfully",
        "data": user.to_public(),
        "success": true
    })))
}

pub async fn update_user(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("✏️ PATCH /api/users/{}", id);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "User updated successfully",
            "data": {},
            "success": true
        })));
    }

    request.validate()?;

    let user = user_service::update_user(&db, &id, request.to_document())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    log::info!("✅ User updated: {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User updated successfully",
        "data": user.to_public(),
        "success": true
    })))
}

pub async fn delete_user(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /api/users/{}", id);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "User deleted successfully",
            "data": {},
            "success": true
        })));
    }

    if !user_service::delete_user(&db, &id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    log::info!("✅ User deleted: {}", id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted successfully",
        "data": {},
        "success": true
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_requires_a_field() {
        let request = UpdateUserRequest {
            name: None,
            email: None,
            location: None,
            phone_no: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_rejects_malformed_email() {
        let request = UpdateUserRequest {
            name: None,
            email: Some("not-an-email".to_string()),
            location: None,
            phone_no: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_document_only_carries_provided_fields() {
        let request = UpdateUserRequest {
            name: Some("Ann".to_string()),
            email: Some("Ann@B.com".to_string()),
            location: Some("London".to_string()),
            phone_no: None,
        };
        let fields = request.to_document();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get_str("name").unwrap(), "Ann");
        assert_eq!(fields.get_str("email").unwrap(), "ann@b.com");
        assert_eq!(fields.get_str("location").unwrap(), "London");
        assert!(fields.get("phoneNo").is_none());
    }
}
