use crate::{services::stripe_service, utils::error::AppError};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateIntentRequest {
    /// Amount in the smallest currency unit (pence, cents).
    pub amount: i64,
    pub currency: String,
}

impl CreateIntentRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.amount <= 0 {
            return Err(AppError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(AppError::Validation("Currency is required".to_string()));
        }
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/api/payments/intents",
    tag = "Payments",
    request_body = CreateIntentRequest,
    responses(
        (status = 200, description = "Payment intent created"),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn create_intent(
    request: web::Json<CreateIntentRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!(
        "💳 POST /api/payments/intents - {} {}",
        request.amount,
        request.currency
    );
    request.validate()?;

    let intent = stripe_service::create_intent(request.amount, &request.currency).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payment intent created",
        "data": {
            "clientSecret": intent.client_secret,
            "paymentIntentId": intent.id,
        },
        "success": true
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_request_validates() {
        let request = CreateIntentRequest {
            amount: 499,
            currency: "gbp".to_string(),
        };
        assert!(request.validate().is_ok());

        let request = CreateIntentRequest {
            amount: 0,
            currency: "gbp".to_string(),
        };
        assert!(request.validate().is_err());

        let request = CreateIntentRequest {
            amount: 499,
            currency: "".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
