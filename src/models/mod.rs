pub mod order;
pub mod scanned_history;
pub mod user;

pub use order::*;
pub use scanned_history::*;
pub use user::*;
