//! Shared server state

use crate::core::Config;
use crate::db::DbService;
use crate::orders::OrderService;

/// State handed to every request handler
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub orders: OrderService,
}

impl ServerState {
    /// State with the default oracles and publisher
    pub fn new(config: Config, db: DbService) -> Self {
        let orders = OrderService::new(db.pool.clone());
        Self { config, db, orders }
    }

    pub fn with_orders(mut self, orders: OrderService) -> Self {
        self.orders = orders;
        self
    }
}
