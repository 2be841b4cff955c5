//! Order Lifecycle & Stock Reconciliation
//!
//! - **composer**: prices requested lines against the catalog
//! - **inventory**: race-safe stock counters
//! - **discount**: discount rows and their recomputation
//! - **state_machine**: status transitions and their side effects
//! - **edit**: item replacement with stock deltas
//! - **service**: `OrderService`, the transactional facade
//!
//! # Data Flow
//!
//! ```text
//! Request → Composer → (Edit diff) → Discounts → Totals
//!                                                   ↓
//!                      one transaction: rows + stock + payment
//!                                                   ↓
//!                                           EventPublisher
//! ```

pub mod composer;
pub mod create;
pub mod discount;
pub mod edit;
pub mod error;
pub mod events;
pub mod inventory;
pub mod money;
pub mod oracles;
pub mod service;
pub mod state_machine;

// Re-exports
pub use error::{OrderError, OrderResult};
pub use events::{EventPublisher, TracingPublisher};
pub use oracles::{
    AlwaysAvailable, AvailabilityOracle, NoVouchers, VoucherKey, VoucherLine, VoucherQuote,
    VoucherRejection, VoucherRequest, VoucherOracle,
};
pub use service::{OrderService, RequestContext};
