use crate::utils::error::AppError;
use serde::Deserialize;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

fn stripe_secret_key() -> Result<String, AppError> {
    std::env::var("STRIPE_SECRET_KEY")
        .map_err(|_| AppError::Internal("STRIPE_SECRET_KEY not configured".to_string()))
}

/// Creates a Stripe payment intent for the given amount (smallest currency
/// unit) and currency, with automatic payment methods enabled. The returned
/// `client_secret` is what the client uses to confirm the payment.
pub async fn create_intent(amount: i64, currency: &str) -> Result<PaymentIntent, AppError> {
    let secret_key = stripe_secret_key()?;

    log::info!("💳 Creating payment intent: {} {}", amount, currency);

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/payment_intents", STRIPE_API_BASE))
        .bearer_auth(&secret_key)
        .form(&[
            ("amount", amount.to_string().as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::ExternalApi(format!(
            "Stripe API error {}: {}",
            status, body
        )));
    }

    let intent: PaymentIntent = response.json().await?;

    log::info!("✅ Payment intent created: {}", intent.id);

    Ok(intent)
}
