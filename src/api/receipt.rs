use crate::{
    database::MongoDB,
    middleware::auth::AuthenticatedUser,
    services::{email_service, email_service::ReceiptEmail, user_service},
    utils::error::AppError,
};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReceiptRequest {
    #[serde(rename = "productName")]
    pub product_name: String,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
    pub date: String,
}

impl ReceiptRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.product_name.trim().is_empty()
            || self.payment_method.trim().is_empty()
            || self.date.trim().is_empty()
        {
            return Err(AppError::Validation(
                "productName, subtotal, tax, total, paymentMethod and date are required"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

async fn load_recipient(
    db: &MongoDB,
    principal: &AuthenticatedUser,
) -> Result<crate::models::User, AppError> {
    if principal.is_guest() {
        return Err(AppError::Forbidden(
            "Access denied for guest users".to_string(),
        ));
    }

    user_service::find_user_by_id(db, &principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// HTML receipt. Unlike the registration flows, a failed send here is fatal:
/// the receipt is the whole point of the call.
pub async fn send_receipt(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    request: web::Json<ReceiptRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🧾 POST /api/receipt");

    let user = load_recipient(&db, &principal).await?;
    request.validate()?;

    email_service::send_receipt(&ReceiptEmail {
        email: &user.email,
        name: &user.name,
        product_name: &request.product_name,
        subtotal: request.subtotal,
        tax: request.tax,
        total: request.total,
        payment_method: &request.payment_method,
        date: &request.date,
    })
    .await?;

    log::info!("✅ Receipt emailed to {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Receipt sent successfully",
        "data": {},
        "success": true
    })))
}

pub async fn send_receipt_attachment(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    request: web::Json<ReceiptRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🧾 POST /api/receipt/attachment");

    let user = load_recipient(&db, &principal).await?;
    request.validate()?;

    email_service::send_receipt_attachment(&ReceiptEmail {
        email: &user.email,
        name: &user.name,
        product_name: &request.product_name,
        subtotal: request.subtotal,
        tax: request.tax,
        total: request.total,
        payment_method: &request.payment_method,
        date: &request.date,
    })
    .await?;

    log::info!("✅ Receipt with attachment emailed to {}", user.email);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Receipt sent successfully",
        "data": {},
        "success": true
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_request_requires_text_fields() {
        let request = ReceiptRequest {
            product_name: "Oat Milk".to_string(),
            subtotal: 4.5,
            tax: 0.45,
            total: 4.95,
            payment_method: "card".to_string(),
            date: "2025-01-15".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = ReceiptRequest {
            product_name: "".to_string(),
            subtotal: 4.5,
            tax: 0.45,
            total: 4.95,
            payment_method: "card".to_string(),
            date: "2025-01-15".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
