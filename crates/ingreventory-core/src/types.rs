//! # Domain Types
//!
//! Core domain types used throughout Ingreventory.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │                        ┌─────────────────┐                              │
//! │                        │     Store       │  tenant root                 │
//! │                        └────────┬────────┘                              │
//! │        ┌───────────────┬────────┼─────────────┬───────────────┐         │
//! │        ▼               ▼        ▼             ▼               ▼         │
//! │  ┌───────────┐  ┌───────────┐ ┌───────────┐ ┌──────────┐ ┌──────────┐  │
//! │  │ Category  │  │  Product  │ │Ingredient │ │  Order   │ │ Cashflow │  │
//! │  │           │◄─│ recipe ───┼─►  stock    │ │ items[]  │ │  in/out  │  │
//! │  │           │  │ addons ───┼─►           │ │ status   │ │          │  │
//! │  └───────────┘  └───────────┘ └───────────┘ └──────────┘ └──────────┘  │
//! │                                                                         │
//! │  User (role, store)         PaymentSetting (one per store)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Field names are snake_case in Rust and camelCase on the wire
//! (`price_cents` ⇄ `priceCents`). Ids are UUID v4 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::money::Money;

fn default_count() -> i64 {
    1
}

fn default_true() -> bool {
    true
}

fn default_unit() -> String {
    crate::DEFAULT_UNIT.to_string()
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle of an order.
///
/// ## State Machine
/// ```text
/// pending ──► processing ──► shipped ──► delivered
///    │            │             │            │
///    └────────────┴──────┬──────┴────────────┘
///                        ▼
///                    cancelled
/// ```
/// Any status may move to any other; nothing is terminal. Only the move
/// INTO `shipped` from a different status deducts ingredient stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether moving from `self` to `target` must deduct ingredient stock.
    ///
    /// ```rust
    /// use ingreventory_core::OrderStatus;
    ///
    /// assert!(OrderStatus::Pending.triggers_deduction(OrderStatus::Shipped));
    /// assert!(!OrderStatus::Shipped.triggers_deduction(OrderStatus::Shipped));
    /// assert!(!OrderStatus::Pending.triggers_deduction(OrderStatus::Delivered));
    /// ```
    #[inline]
    pub fn triggers_deduction(&self, target: OrderStatus) -> bool {
        target == OrderStatus::Shipped && *self != OrderStatus::Shipped
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

// =============================================================================
// Product
// =============================================================================

/// One base-recipe entry: `count` units of an ingredient per unit sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecipeEntry {
    #[serde(alias = "ingredient")]
    pub ingredient_id: String,
    #[serde(default = "default_count")]
    pub count: i64,
}

/// A group heading for add-ons ("Size", "Toppings").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddonType {
    pub label: String,
}

/// An optional, separately selectable modifier of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Addon {
    /// Label of the [`AddonType`] this add-on is grouped under.
    #[serde(rename = "type")]
    pub addon_type: String,
    pub label: String,
    #[serde(alias = "ingredient")]
    pub ingredient_id: String,
    /// Ingredient units consumed when selected. Not scaled by line quantity.
    #[serde(default = "default_count")]
    pub quantity: i64,
    #[serde(default)]
    pub cost_cents: i64,
    #[serde(default)]
    pub price_cents: i64,
}

/// A catalog entry owned by a store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub store_id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub cost_cents: i64,
    pub price_cents: i64,
    /// Image URL.
    pub image: String,

    /// Cleared by fulfillment when a base-recipe ingredient runs out.
    pub in_stock: bool,

    pub ingredients: Vec<RecipeEntry>,
    pub addon_types: Vec<AddonType>,
    pub addons: Vec<Addon>,

    /// Legacy unit counter decremented at order creation.
    pub inventory: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds an empty, in-stock product. The id is left blank for the
    /// caller to assign, usually with `generate_id`.
    pub fn new(store_id: &str, category_id: &str, name: &str) -> Self {
        let now = Utc::now();
        Product {
            id: String::new(),
            store_id: store_id.to_string(),
            category_id: category_id.to_string(),
            name: name.to_string(),
            description: String::new(),
            cost_cents: 0,
            price_cents: 0,
            image: String::new(),
            in_stock: true,
            ingredients: Vec::new(),
            addon_types: Vec::new(),
            addons: Vec::new(),
            inventory: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// First add-on with a matching label. Labels are not required to be
    /// unique, later duplicates are shadowed.
    pub fn find_addon(&self, label: &str) -> Option<&Addon> {
        self.addons.iter().find(|addon| addon.label == label)
    }
}

// =============================================================================
// Ingredient
// =============================================================================

/// A stocked raw material owned by a store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Unit of measure (`g`, `ml`, `pc`, ...).
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Current stock in `unit`. May be negative after over-selling.
    pub stock: i64,
    pub price_per_unit_cents: i64,
    /// Markup in basis points (2500 = 25%).
    pub markup_bps: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub last_restocked: Option<DateTime<Utc>>,
}

impl Ingredient {
    /// Per-unit selling price including markup.
    pub fn selling_price_per_unit(&self) -> Money {
        let bps = u32::try_from(self.markup_bps.max(0)).unwrap_or(u32::MAX);
        Money::from_cents(self.price_per_unit_cents).with_markup(bps)
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.stock <= 0
    }
}

// =============================================================================
// Order
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// An add-on chosen on a line item, captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedAddon {
    pub label: String,
    #[serde(default)]
    pub price_cents: i64,
}

/// A line of an order. Name and prices are snapshots taken at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub subtotal_cents: i64,
    #[serde(default)]
    pub addons: Vec<SelectedAddon>,
}

impl LineItem {
    pub fn addon_labels(&self) -> Vec<&str> {
        self.addons.iter().map(|addon| addon.label.as_str()).collect()
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A customer order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    pub payment_method_id: Option<String>,
    pub items: Vec<LineItem>,
    pub store_id: Option<String>,
    pub store_name: Option<String>,
    pub user_id: Option<String>,
    pub total_cost_cents: i64,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub cash_given_cents: Option<i64>,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }
}

/// Checkout payload. Becomes an [`Order`] with status `pending`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method_id: Option<String>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub total_cost_cents: i64,
    pub subtotal_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    #[serde(default)]
    pub cash_given_cents: Option<i64>,
}

impl NewOrder {
    /// Materialises the order with a fresh id and `pending` status.
    pub fn into_order(self, id: String, now: DateTime<Utc>) -> Order {
        Order {
            id,
            customer: self.customer,
            shipping_address: self.shipping_address,
            payment_method_id: self.payment_method_id,
            items: self.items,
            store_id: self.store_id,
            store_name: self.store_name,
            user_id: self.user_id,
            total_cost_cents: self.total_cost_cents,
            subtotal_cents: self.subtotal_cents,
            shipping_cents: self.shipping_cents,
            total_cents: self.total_cents,
            cash_given_cents: self.cash_given_cents,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of an order. Setting `status` here never deducts stock.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub customer: Option<Customer>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method_id: Option<String>,
    pub store_name: Option<String>,
    pub shipping_cents: Option<i64>,
    pub total_cents: Option<i64>,
    pub cash_given_cents: Option<i64>,
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    pub fn apply(self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(customer) = self.customer {
            order.customer = customer;
        }
        if let Some(address) = self.shipping_address {
            order.shipping_address = address;
        }
        if let Some(method) = self.payment_method_id {
            order.payment_method_id = Some(method);
        }
        if let Some(name) = self.store_name {
            order.store_name = Some(name);
        }
        if let Some(shipping) = self.shipping_cents {
            order.shipping_cents = shipping;
        }
        if let Some(total) = self.total_cents {
            order.total_cents = total;
        }
        if let Some(cash) = self.cash_given_cents {
            order.cash_given_cents = Some(cash);
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        order.updated_at = now;
    }
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BusinessType {
    Restaurant,
    Cafe,
    Bakery,
    Grocery,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StoreAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// A tenant business.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub name: String,
    /// Derived from `name` via [`crate::validation::slugify`].
    pub slug: String,
    pub address: StoreAddress,
    /// Currency symbol, e.g. `$`.
    pub currency: String,
    /// ISO currency code, e.g. `USD`.
    pub currency_code: String,
    pub phone: String,
    pub email: String,
    pub business_type: BusinessType,
    pub tax_id: Option<String>,
    pub background_image: Option<String>,
    pub logo_image: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Number of products in this category. Populated by listings.
    #[serde(default)]
    pub product_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Moderator,
    Cashier,
    User,
}

impl UserRole {
    /// Staff may manage the catalog, stock and orders of their store.
    #[inline]
    pub fn is_staff(&self) -> bool {
        !matches!(self, UserRole::User)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Moderator => "moderator",
            UserRole::Cashier => "cashier",
            UserRole::User => "user",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::User
    }
}

impl FromStr for UserRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "moderator" => Ok(UserRole::Moderator),
            "cashier" => Ok(UserRole::Cashier),
            "user" => Ok(UserRole::User),
            _ => Err(CoreError::Validation(
                crate::error::ValidationError::NotAllowed {
                    field: "role".to_string(),
                    allowed: vec![
                        "admin".to_string(),
                        "moderator".to_string(),
                        "cashier".to_string(),
                        "user".to_string(),
                    ],
                },
            )),
        }
    }
}

/// A user account. Credentials live only in the database layer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub store_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub is_active: bool,
    #[ts(as = "Option<String>")]
    pub last_login: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cashflow
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CashflowType {
    In,
    Out,
}

/// A manual cash movement recorded against a store's till.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cashflow {
    pub id: String,
    #[serde(rename = "type")]
    pub flow_type: CashflowType,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub user_id: Option<String>,
    pub store_id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cashflow {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Payment Settings
// =============================================================================

/// A built-in payment option (cash, QRIS, card, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentOption {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    /// Provider-specific settings, stored as-is.
    #[serde(default)]
    #[ts(type = "unknown")]
    pub config: serde_json::Value,
    /// Image URL or data URI.
    #[serde(default)]
    pub image: Option<String>,
}

/// A store-defined payment method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomPaymentMethod {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    #[ts(type = "unknown")]
    pub config: serde_json::Value,
    #[serde(default)]
    pub image: Option<String>,
}

/// Payment configuration of a store. At most one per store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSetting {
    pub id: String,
    pub store_id: String,
    #[serde(default)]
    pub options: Vec<PaymentOption>,
    #[serde(default)]
    pub custom_methods: Vec<CustomPaymentMethod>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_only_entering_shipped_triggers_deduction() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = to == OrderStatus::Shipped && from != OrderStatus::Shipped;
                assert_eq!(from.triggers_deduction(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_addon_defaults_from_json() {
        let addon: Addon = serde_json::from_str(
            r#"{"type":"Toppings","label":"Extra Cheese","ingredient":"ing-1"}"#,
        )
        .unwrap();
        assert_eq!(addon.quantity, 1);
        assert_eq!(addon.ingredient_id, "ing-1");
        assert_eq!(addon.price_cents, 0);
    }

    #[test]
    fn test_find_addon_returns_first_match() {
        let mut product = Product::new("s", "c", "Burger");
        for (qty, ing) in [(1, "cheese-a"), (5, "cheese-b")] {
            product.addons.push(Addon {
                addon_type: "Toppings".into(),
                label: "Cheese".into(),
                ingredient_id: ing.into(),
                quantity: qty,
                cost_cents: 0,
                price_cents: 0,
            });
        }
        assert_eq!(product.find_addon("Cheese").unwrap().ingredient_id, "cheese-a");
        assert!(product.find_addon("Bacon").is_none());
    }

    #[test]
    fn test_order_patch_sets_status_and_touches_updated_at() {
        let now = Utc::now();
        let mut order = NewOrder {
            customer: Customer::default(),
            shipping_address: ShippingAddress::default(),
            payment_method_id: None,
            items: vec![],
            store_id: None,
            store_name: None,
            user_id: None,
            total_cost_cents: 0,
            subtotal_cents: 0,
            shipping_cents: 0,
            total_cents: 0,
            cash_given_cents: None,
        }
        .into_order("o-1".into(), now);
        assert_eq!(order.status, OrderStatus::Pending);

        let later = now + chrono::Duration::seconds(5);
        OrderPatch {
            status: Some(OrderStatus::Delivered),
            ..Default::default()
        }
        .apply(&mut order, later);

        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.updated_at, later);
        assert_eq!(order.created_at, now);
    }

    #[test]
    fn test_user_role_capabilities() {
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Cashier.is_staff());
        assert!(!UserRole::User.is_staff());
        assert_eq!("moderator".parse::<UserRole>().unwrap(), UserRole::Moderator);
    }

    #[test]
    fn test_ingredient_selling_price() {
        let ingredient = Ingredient {
            id: "i".into(),
            store_id: "s".into(),
            name: "Flour".into(),
            description: None,
            unit: default_unit(),
            stock: 0,
            price_per_unit_cents: 200,
            markup_bps: 5000,
            created_at: Utc::now(),
            last_restocked: None,
        };
        assert_eq!(ingredient.selling_price_per_unit().cents(), 300);
        assert!(ingredient.is_depleted());
    }
}
