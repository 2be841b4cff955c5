//! Order Item Composer
//!
//! Turns requested lines into priced `OrderItem` / `OrderItemAddon` rows
//! plus a subtotal. Catalog lines are checked for existence, active state
//! and (optionally) stock; the promotional price wins over the catalog
//! price while a promotion is running. Unknown or unavailable add-ons are
//! dropped silently; add-ons on custom lines are rejected.

use rust_decimal::Decimal;
use shared::models::{
    AddonItem, CatalogEntry, MenuItem, MerchantSettings, OrderItem, OrderItemAddon,
};
use shared::order::{AddonInput, OrderItemInput};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

use super::error::{OrderError, OrderResult};
use super::inventory::StockUsage;
use super::money::{self, MAX_QUANTITY, line_amount, round2, to_decimal, to_f64};
use crate::db::repository::{catalog, promotion};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

/// Where a requested line comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSource {
    Catalog { menu_item_id: i64 },
    Custom { name: String, price: f64 },
}

impl ItemSource {
    pub fn from_input(input: &OrderItemInput) -> OrderResult<Self> {
        match (input.menu_item_id, &input.custom) {
            (Some(menu_item_id), None) => Ok(Self::Catalog { menu_item_id }),
            (None, Some(custom)) => Ok(Self::Custom {
                name: custom.name.trim().to_string(),
                price: custom.price,
            }),
            (Some(_), Some(_)) => Err(OrderError::Validation(
                "An order line must reference a menu item or be custom, not both".into(),
            )),
            (None, None) => Err(OrderError::Validation(
                "An order line must reference a menu item or carry a custom item".into(),
            )),
        }
    }
}

/// One priced line with its add-ons
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedLine {
    pub item: OrderItem,
    pub addons: Vec<OrderItemAddon>,
}

/// Composer output
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedOrder {
    pub lines: Vec<ComposedLine>,
    pub subtotal: f64,
}

impl ComposedOrder {
    /// Split into flat row lists (insert order preserved)
    pub fn rows(&self) -> (Vec<OrderItem>, Vec<OrderItemAddon>) {
        let items = self.lines.iter().map(|l| l.item.clone()).collect();
        let addons = self
            .lines
            .iter()
            .flat_map(|l| l.addons.iter().cloned())
            .collect();
        (items, addons)
    }

    pub fn stock_usage(&self) -> StockUsage {
        let (items, addons) = self.rows();
        StockUsage::from_rows(&items, &addons)
    }
}

pub struct Composer<'a> {
    pool: &'a SqlitePool,
    merchant_id: i64,
    settings: &'a MerchantSettings,
    priced_at: i64,
    check_stock: bool,
}

impl<'a> Composer<'a> {
    pub fn new(
        pool: &'a SqlitePool,
        merchant_id: i64,
        settings: &'a MerchantSettings,
        priced_at: i64,
    ) -> Self {
        Self {
            pool,
            merchant_id,
            settings,
            priced_at,
            check_stock: true,
        }
    }

    /// Absolute stock pre-check per line (on by default). Edits turn it off
    /// and check deltas instead.
    pub fn with_stock_check(mut self, check_stock: bool) -> Self {
        self.check_stock = check_stock;
        self
    }

    pub async fn compose(
        &self,
        order_id: i64,
        inputs: &[OrderItemInput],
    ) -> OrderResult<ComposedOrder> {
        if inputs.is_empty() {
            return Err(OrderError::Empty);
        }

        let mut lines = Vec::with_capacity(inputs.len());
        let mut subtotal = Decimal::ZERO;
        for input in inputs {
            let line = self.compose_line(order_id, input).await?;
            subtotal = round2(subtotal + to_decimal(line.item.subtotal));
            lines.push(line);
        }

        Ok(ComposedOrder {
            lines,
            subtotal: to_f64(subtotal),
        })
    }

    async fn compose_line(&self, order_id: i64, input: &OrderItemInput) -> OrderResult<ComposedLine> {
        if input.quantity < 1 || input.quantity > MAX_QUANTITY {
            return Err(OrderError::Validation(format!(
                "quantity must be between 1 and {MAX_QUANTITY}, got {}",
                input.quantity
            )));
        }
        validate_optional_text(&input.notes, "notes", MAX_NOTE_LEN)?;

        let item_id = snowflake_id();
        let (menu_item_id, name, unit_price, addons) = match ItemSource::from_input(input)? {
            ItemSource::Custom { name, price } => {
                if !input.addons.is_empty() {
                    return Err(OrderError::InvalidCustomItem(
                        "Custom items cannot carry add-ons".into(),
                    ));
                }
                self.validate_custom(&name, price)?;
                (None, name, to_f64(to_decimal(price)), Vec::new())
            }
            ItemSource::Catalog { menu_item_id } => {
                let menu_item = self.load_menu_item(menu_item_id, input.quantity).await?;
                let unit_price = self.unit_price(&menu_item).await?;
                let addons = self.compose_addons(item_id, input.quantity, &input.addons).await?;
                (Some(menu_item.id), menu_item.name, unit_price, addons)
            }
        };

        let addon_total: Decimal = addons
            .iter()
            .fold(Decimal::ZERO, |acc, a| round2(acc + to_decimal(a.subtotal)));
        let line_subtotal = round2(line_amount(unit_price, input.quantity) + addon_total);

        Ok(ComposedLine {
            item: OrderItem {
                id: item_id,
                order_id,
                menu_item_id,
                is_custom: menu_item_id.is_none(),
                name,
                unit_price,
                quantity: input.quantity,
                subtotal: to_f64(line_subtotal),
                notes: input.notes.clone(),
            },
            addons,
        })
    }

    fn validate_custom(&self, name: &str, price: f64) -> OrderResult<()> {
        let max_len = self.settings.custom_item_max_name_length;
        if name.is_empty() {
            return Err(OrderError::InvalidCustomItem(
                "Custom item name must not be empty".into(),
            ));
        }
        if name.chars().count() > max_len {
            return Err(OrderError::InvalidCustomItem(format!(
                "Custom item name is too long (max {max_len} chars)"
            )));
        }
        money::require_finite(price, "custom item price")?;
        let max_price = self.settings.custom_item_max_price;
        if price <= 0.0 || price > max_price {
            return Err(OrderError::InvalidCustomItem(format!(
                "Custom item price must be greater than 0 and at most {max_price}"
            )));
        }
        Ok(())
    }

    async fn load_menu_item(&self, menu_item_id: i64, quantity: i64) -> OrderResult<MenuItem> {
        let menu_item = catalog::find_menu_item(self.pool, self.merchant_id, menu_item_id)
            .await?
            .ok_or(OrderError::ItemNotFound(menu_item_id))?;
        if menu_item.is_deleted() {
            return Err(OrderError::ItemUnavailable(menu_item.name));
        }
        if self.check_stock
            && let Some(stock) = menu_item.tracked_stock()
            && stock < quantity
        {
            return Err(OrderError::insufficient_stock(menu_item.name));
        }
        if !menu_item.is_active() && !self.tolerates_sold_out(&menu_item) {
            return Err(OrderError::ItemUnavailable(menu_item.name));
        }
        Ok(menu_item)
    }

    /// Without the absolute check (edits), an item switched off only
    /// because its counter hit zero stays usable; the delta pre-flight
    /// decides whether more of it can be taken.
    fn tolerates_sold_out(&self, entry: &impl CatalogEntry) -> bool {
        !self.check_stock && !entry.is_deleted() && entry.tracked_stock() == Some(0)
    }

    async fn unit_price(&self, menu_item: &MenuItem) -> OrderResult<f64> {
        let promo = promotion::find_active_price(
            self.pool,
            self.merchant_id,
            menu_item.id,
            self.priced_at,
        )
        .await?;
        let price = match promo {
            Some(promo_price) => {
                tracing::debug!(
                    menu_item_id = menu_item.id,
                    catalog_price = menu_item.price,
                    promo_price,
                    "Promotional price applied"
                );
                promo_price
            }
            None => menu_item.price,
        };
        Ok(to_f64(to_decimal(price)))
    }

    async fn compose_addons(
        &self,
        order_item_id: i64,
        line_quantity: i64,
        inputs: &[AddonInput],
    ) -> OrderResult<Vec<OrderItemAddon>> {
        let mut addons = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.quantity < 1 || input.quantity > MAX_QUANTITY {
                return Err(OrderError::Validation(format!(
                    "add-on quantity must be between 1 and {MAX_QUANTITY}, got {}",
                    input.quantity
                )));
            }
            let Some(addon) = self.load_addon(input.addon_item_id).await? else {
                tracing::debug!(addon_item_id = input.addon_item_id, "Dropping unavailable add-on");
                continue;
            };

            let consumed = input.quantity * line_quantity;
            if self.check_stock
                && let Some(stock) = addon.tracked_stock()
                && stock < consumed
            {
                return Err(OrderError::insufficient_stock(addon.name));
            }

            let unit_price = to_f64(to_decimal(addon.price));
            let per_unit = line_amount(unit_price, input.quantity);
            let subtotal = round2(per_unit * Decimal::from(line_quantity));
            addons.push(OrderItemAddon {
                id: snowflake_id(),
                order_item_id,
                addon_item_id: addon.id,
                name: addon.name,
                unit_price,
                quantity: input.quantity,
                subtotal: to_f64(subtotal),
            });
        }
        Ok(addons)
    }

    /// Orderable add-on of this merchant, or `None`
    async fn load_addon(&self, addon_item_id: i64) -> OrderResult<Option<AddonItem>> {
        let addon = catalog::find_addon_item(self.pool, self.merchant_id, addon_item_id).await?;
        Ok(addon.filter(|a| a.is_orderable() || self.tolerates_sold_out(a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::catalog::{NewCatalogItem, create_addon_item, create_menu_item};
    use crate::db::repository::merchant;
    use crate::orders::inventory::StockKey;
    use shared::models::Promotion;
    use shared::util::now_millis;

    struct Fixture {
        db: DbService,
        merchant_id: i64,
        settings: MerchantSettings,
    }

    impl Fixture {
        async fn new() -> Self {
            let db = DbService::open_in_memory().await.unwrap();
            let m = merchant::create(&db.pool, "Pho 99", None).await.unwrap();
            Self {
                db,
                merchant_id: m.id,
                settings: MerchantSettings::default(),
            }
        }

        fn composer(&self) -> Composer<'_> {
            Composer::new(&self.db.pool, self.merchant_id, &self.settings, now_millis())
        }
    }

    #[tokio::test]
    async fn test_prices_lines_and_addons() {
        let fx = Fixture::new().await;
        let pho = create_menu_item(&fx.db.pool, &NewCatalogItem::untracked(fx.merchant_id, "Pho", 10.5))
            .await
            .unwrap();
        let egg = create_addon_item(&fx.db.pool, &NewCatalogItem::tracked(fx.merchant_id, "Egg", 1.25, 10))
            .await
            .unwrap();

        let composed = fx
            .composer()
            .compose(1, &[OrderItemInput::catalog(pho.id, 2).with_addon(egg.id, 2)])
            .await
            .unwrap();

        let line = &composed.lines[0];
        assert_eq!(line.item.unit_price, 10.5);
        assert_eq!(line.addons[0].subtotal, 5.0);
        assert_eq!(line.item.subtotal, 26.0);
        assert_eq!(composed.subtotal, 26.0);
        assert_eq!(composed.stock_usage().get(&StockKey::addon(egg.id)), 4);
    }

    #[tokio::test]
    async fn test_promotion_price_wins_inside_window() {
        let fx = Fixture::new().await;
        let pho = create_menu_item(&fx.db.pool, &NewCatalogItem::untracked(fx.merchant_id, "Pho", 10.0))
            .await
            .unwrap();
        let now = now_millis();
        promotion::create(
            &fx.db.pool,
            &Promotion {
                id: snowflake_id(),
                merchant_id: fx.merchant_id,
                menu_item_id: pho.id,
                promo_price: 7.5,
                starts_at: now - 60_000,
                ends_at: now + 60_000,
                is_active: true,
            },
        )
        .await
        .unwrap();

        let composed = fx
            .composer()
            .compose(1, &[OrderItemInput::catalog(pho.id, 3)])
            .await
            .unwrap();
        assert_eq!(composed.lines[0].item.unit_price, 7.5);
        assert_eq!(composed.subtotal, 22.5);
    }

    #[tokio::test]
    async fn test_unavailable_addons_are_dropped() {
        let fx = Fixture::new().await;
        let pho = create_menu_item(&fx.db.pool, &NewCatalogItem::untracked(fx.merchant_id, "Pho", 10.0))
            .await
            .unwrap();
        let sold_out = create_addon_item(
            &fx.db.pool,
            &NewCatalogItem::tracked(fx.merchant_id, "Beef", 3.0, 0),
        )
        .await
        .unwrap();

        let composed = fx
            .composer()
            .compose(
                1,
                &[OrderItemInput::catalog(pho.id, 1)
                    .with_addon(sold_out.id, 1)
                    .with_addon(424242, 1)],
            )
            .await
            .unwrap();
        assert!(composed.lines[0].addons.is_empty());
        assert_eq!(composed.subtotal, 10.0);
    }

    #[tokio::test]
    async fn test_rejects_missing_inactive_and_short_stock() {
        let fx = Fixture::new().await;
        let err = fx
            .composer()
            .compose(1, &[OrderItemInput::catalog(999, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ItemNotFound(999)));

        let limited = create_menu_item(
            &fx.db.pool,
            &NewCatalogItem::tracked(fx.merchant_id, "Banh Mi", 6.0, 2),
        )
        .await
        .unwrap();
        let err = fx
            .composer()
            .compose(1, &[OrderItemInput::catalog(limited.id, 3)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Insufficient stock for Banh Mi");

        // Without the pre-check the same request composes
        let composed = fx
            .composer()
            .with_stock_check(false)
            .compose(1, &[OrderItemInput::catalog(limited.id, 3)])
            .await
            .unwrap();
        assert_eq!(composed.subtotal, 18.0);

        let gone = create_menu_item(
            &fx.db.pool,
            &NewCatalogItem::tracked(fx.merchant_id, "Spring Roll", 4.0, 0),
        )
        .await
        .unwrap();
        let err = fx
            .composer()
            .compose(1, &[OrderItemInput::catalog(gone.id, 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { ref name } if name == "Spring Roll"));

        // Sold out lines are left to the edit pre-flight
        assert!(
            fx.composer()
                .with_stock_check(false)
                .compose(1, &[OrderItemInput::catalog(gone.id, 1)])
                .await
                .is_ok()
        );

        catalog::set_active(&fx.db.pool, catalog::CatalogKind::MenuItem, limited.id, false)
            .await
            .unwrap();
        for check in [true, false] {
            let err = fx
                .composer()
                .with_stock_check(check)
                .compose(1, &[OrderItemInput::catalog(limited.id, 1)])
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::ItemUnavailable(ref n) if n == "Banh Mi"));
        }
    }

    #[tokio::test]
    async fn test_custom_items() {
        let fx = Fixture::new().await;
        let composed = fx
            .composer()
            .compose(1, &[OrderItemInput::custom("  Birthday cake  ", 12.346, 1)])
            .await
            .unwrap();
        let line = &composed.lines[0].item;
        assert!(line.is_custom);
        assert_eq!(line.menu_item_id, None);
        assert_eq!(line.name, "Birthday cake");
        assert_eq!(line.unit_price, 12.35);
        assert!(composed.stock_usage().is_empty());

        for bad in [
            OrderItemInput::custom("", 5.0, 1),
            OrderItemInput::custom("x".repeat(101), 5.0, 1),
            OrderItemInput::custom("Cake", 0.0, 1),
            OrderItemInput::custom("Cake", 10_000.01, 1),
            OrderItemInput::custom("Cake", 5.0, 1).with_addon(1, 1),
        ] {
            let err = fx.composer().compose(1, &[bad]).await.unwrap_err();
            assert!(matches!(err, OrderError::InvalidCustomItem(_)), "{err}");
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_and_bad_quantity() {
        let fx = Fixture::new().await;
        assert!(matches!(
            fx.composer().compose(1, &[]).await.unwrap_err(),
            OrderError::Empty
        ));
        assert!(matches!(
            fx.composer()
                .compose(1, &[OrderItemInput::custom("Cake", 5.0, 0)])
                .await
                .unwrap_err(),
            OrderError::Validation(_)
        ));
    }
}
