//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, serialized to clients as strings.

pub mod catalog;
pub mod discount;
pub mod merchant;
pub mod order;
pub mod payment;

// Re-exports
pub use catalog::*;
pub use discount::*;
pub use merchant::*;
pub use order::*;
pub use payment::*;
