pub mod email_service;
pub mod order_service;
pub mod places_service;
pub mod product_service;
pub mod scanned_history_service;
pub mod stripe_service;
pub mod token_service;
pub mod user_service;
