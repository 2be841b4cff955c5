//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use order_engine::db::DbService;
use order_engine::db::repository::catalog::{self, CatalogKind, NewCatalogItem};
use order_engine::db::repository::merchant;
use order_engine::orders::{
    AvailabilityOracle, OrderService, RequestContext, VoucherOracle, VoucherQuote,
    VoucherRejection, VoucherRequest,
};
use shared::models::{DiscountType, MerchantSettings, OrderType};
use shared::order::{CreateOrderRequest, OrderItemInput};
use sqlx::SqlitePool;

/// Percentage voucher over the whole subtotal, optionally capped
pub struct PercentVoucher {
    pub percent: f64,
    pub max_discount: Option<f64>,
}

#[async_trait]
impl VoucherOracle for PercentVoucher {
    async fn quote(&self, request: VoucherRequest) -> Result<VoucherQuote, VoucherRejection> {
        if request.key.code.as_deref() == Some("EXPIRED") {
            return Err(VoucherRejection {
                name: "EXPIRED".into(),
                reason: "voucher has expired".into(),
            });
        }
        let raw = (request.subtotal * self.percent).round() / 100.0;
        let amount = self.max_discount.map_or(raw, |cap| raw.min(cap));
        Ok(VoucherQuote {
            label: format!("{}% off", self.percent),
            discount_type: DiscountType::Percentage,
            discount_value: self.percent,
            amount,
            eligible_subtotal: request.subtotal,
            max_discount: self.max_discount,
        })
    }
}

/// Quotes like [`PercentVoucher`] but sells out an add-on while doing so,
/// the way a concurrent order would between the edit pre-flight and the
/// stock write.
pub struct SellsOutAddon {
    pub pool: SqlitePool,
    pub addon_id: i64,
}

#[async_trait]
impl VoucherOracle for SellsOutAddon {
    async fn quote(&self, request: VoucherRequest) -> Result<VoucherQuote, VoucherRejection> {
        sqlx::query("UPDATE addon_items SET stock_qty = 0 WHERE id = ?")
            .bind(self.addon_id)
            .execute(&self.pool)
            .await
            .unwrap();
        PercentVoucher {
            percent: 10.0,
            max_discount: None,
        }
        .quote(request)
        .await
    }
}

/// Delivery is closed, everything else open
pub struct NoDelivery;

#[async_trait]
impl AvailabilityOracle for NoDelivery {
    async fn is_mode_available(&self, _merchant_id: i64, order_type: OrderType, _at: i64) -> bool {
        order_type != OrderType::Delivery
    }
}

pub struct Fixture {
    pub db: DbService,
    pub service: OrderService,
    pub ctx: RequestContext,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_settings(MerchantSettings::default()).await
    }

    pub async fn with_settings(settings: MerchantSettings) -> Self {
        let db = DbService::open_in_memory().await.unwrap();
        Self::with_db(db, settings).await
    }

    /// File-backed database with a real connection pool, so concurrent
    /// requests run on separate connections
    pub async fn on_disk(path: &Path, max_connections: u32) -> Self {
        let db = DbService::new(path.to_str().unwrap(), max_connections)
            .await
            .unwrap();
        Self::with_db(db, MerchantSettings::default()).await
    }

    async fn with_db(db: DbService, settings: MerchantSettings) -> Self {
        let m = merchant::create(&db.pool, "Harbour Cafe", Some(&settings))
            .await
            .unwrap();
        let service = OrderService::new(db.pool.clone()).with_voucher_oracle(Arc::new(
            PercentVoucher {
                percent: 10.0,
                max_discount: None,
            },
        ));
        Self {
            db,
            service,
            ctx: RequestContext::new(m.id, Some(77)),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub async fn tracked_item(&self, name: &str, price: f64, stock: i64) -> i64 {
        catalog::create_menu_item(
            self.pool(),
            &NewCatalogItem::tracked(self.ctx.merchant_id, name, price, stock),
        )
        .await
        .unwrap()
        .id
    }

    pub async fn untracked_item(&self, name: &str, price: f64) -> i64 {
        catalog::create_menu_item(
            self.pool(),
            &NewCatalogItem::untracked(self.ctx.merchant_id, name, price),
        )
        .await
        .unwrap()
        .id
    }

    pub async fn tracked_addon(&self, name: &str, price: f64, stock: i64) -> i64 {
        catalog::create_addon_item(
            self.pool(),
            &NewCatalogItem::tracked(self.ctx.merchant_id, name, price, stock),
        )
        .await
        .unwrap()
        .id
    }

    pub async fn stock(&self, kind: CatalogKind, id: i64) -> i64 {
        catalog::find_stock(self.pool(), kind, id)
            .await
            .unwrap()
            .unwrap()
            .stock_qty
            .unwrap()
    }

    pub async fn menu_stock(&self, id: i64) -> i64 {
        self.stock(CatalogKind::MenuItem, id).await
    }

    pub async fn menu_active(&self, id: i64) -> bool {
        catalog::find_menu_item(self.pool(), self.ctx.merchant_id, id)
            .await
            .unwrap()
            .unwrap()
            .is_active
    }

    pub async fn order_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool())
            .await
            .unwrap()
    }
}

pub fn request(order_type: &str, items: Vec<OrderItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        order_type: order_type.into(),
        table_number: Some("T4".into()),
        items,
        customer: None,
        payment_method: None,
        scheduled_at: None,
        delivery_address: None,
        voucher: None,
        notes: None,
    }
}

/// A takeaway request scheduled one hour ahead
pub fn scheduled(items: Vec<OrderItemInput>) -> CreateOrderRequest {
    CreateOrderRequest {
        scheduled_at: Some(shared::util::now_millis() + 3_600_000),
        ..request("TAKEAWAY", items)
    }
}
