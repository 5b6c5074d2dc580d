pub mod codes;
pub mod error;
pub mod pdf;
