use chrono::{Duration, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use rand::Rng;

/// One-time numeric code with its expiry, used for both email verification
/// and password reset.
pub struct OneTimeCode {
    pub code: String,
    pub expires_at: BsonDateTime,
}

/// Uniformly random 4-digit code (1000-9999 inclusive) valid for 1 hour.
pub fn generate_code() -> OneTimeCode {
    let mut rng = rand::rng();
    let code = rng.random_range(1000..=9999).to_string();
    let expires_at = Utc::now() + Duration::hours(1);

    OneTimeCode {
        code,
        expires_at: BsonDateTime::from_chrono(expires_at),
    }
}

/// Uniform random perturbation around a reference price. Display estimate
/// only, not sourced pricing: output is non-deterministic by design.
pub fn generate_estimated_price(reference_price: f64, variance_percentage: f64) -> f64 {
    let variance_factor = variance_percentage / 100.0;
    let min_price = reference_price * (1.0 - variance_factor);
    let max_price = reference_price * (1.0 + variance_factor);

    if min_price >= max_price {
        return reference_price;
    }

    let mut rng = rand::rng();
    rng.random_range(min_price..max_price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_four_digits_in_range() {
        for _ in 0..1000 {
            let otc = generate_code();
            assert_eq!(otc.code.len(), 4);
            let value: u32 = otc.code.parse().unwrap();
            assert!((1000..=9999).contains(&value));
        }
    }

    #[test]
    fn test_code_expires_one_hour_ahead() {
        let before = Utc::now();
        let otc = generate_code();
        let after = Utc::now();

        let expires = otc.expires_at.to_chrono();
        assert!(expires >= before + Duration::hours(1));
        assert!(expires <= after + Duration::hours(1));
    }

    #[test]
    fn test_estimated_price_within_variance_bounds() {
        let reference = 25.0;
        for _ in 0..1000 {
            let price = generate_estimated_price(reference, 10.0);
            assert!(price >= reference * 0.9, "price {} below bound", price);
            assert!(price <= reference * 1.1, "price {} above bound", price);
        }
    }

    #[test]
    fn test_estimated_price_zero_reference() {
        assert_eq!(generate_estimated_price(0.0, 10.0), 0.0);
    }
}
