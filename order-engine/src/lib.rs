//! order-engine: multi-tenant order lifecycle and stock reconciliation
//!
//! # Modules
//!
//! - [`orders`]: composer, inventory ledger, discounts, state machine,
//!   edit diff engine and the `OrderService` facade
//! - [`db`]: SQLite pool, migrations and repositories
//! - [`api`]: axum routes
//! - [`core`]: configuration and server state
//! - [`utils`]: logging and validation

pub mod api;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

pub use crate::core::{Config, ServerState};
pub use db::DbService;
pub use orders::{OrderError, OrderResult, OrderService, RequestContext};
