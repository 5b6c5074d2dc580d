pub mod auth;
pub mod health;
pub mod orders;
pub mod payments;
pub mod receipt;
pub mod scanned;
pub mod swagger;
pub mod users;
