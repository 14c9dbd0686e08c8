//! # Order Repository
//!
//! Orders with their embedded line items.
//!
//! Customer and shipping address are flattened into columns; line items
//! (with their selected add-ons) live in `items_json` as an immutable
//! snapshot taken at checkout. Orders are never deleted.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ingreventory_core::{Customer, LineItem, Order, OrderStatus, ShippingAddress};

const ORDER_COLUMNS: &str = r#"
    id, customer_first_name, customer_last_name, customer_email, customer_phone,
    ship_address, ship_city, ship_state, ship_zip_code, payment_method_id,
    items_json, store_id, store_name, user_id, total_cost_cents, subtotal_cents,
    shipping_cents, total_cents, cash_given_cents, status, created_at, updated_at
"#;

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    customer_first_name: String,
    customer_last_name: String,
    customer_email: String,
    customer_phone: String,
    ship_address: String,
    ship_city: String,
    ship_state: String,
    ship_zip_code: String,
    payment_method_id: Option<String>,
    items_json: String,
    store_id: Option<String>,
    store_name: Option<String>,
    user_id: Option<String>,
    total_cost_cents: i64,
    subtotal_cents: i64,
    shipping_cents: i64,
    total_cents: i64,
    cash_given_cents: Option<i64>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<LineItem> =
            serde_json::from_str(&row.items_json).map_err(|e| DbError::corrupt("Order", &row.id, e))?;

        Ok(Order {
            id: row.id,
            customer: Customer {
                first_name: row.customer_first_name,
                last_name: row.customer_last_name,
                email: row.customer_email,
                phone: row.customer_phone,
            },
            shipping_address: ShippingAddress {
                address: row.ship_address,
                city: row.ship_city,
                state: row.ship_state,
                zip_code: row.ship_zip_code,
            },
            payment_method_id: row.payment_method_id,
            items,
            store_id: row.store_id,
            store_name: row.store_name,
            user_id: row.user_id,
            total_cost_cents: row.total_cost_cents,
            subtotal_cents: row.subtotal_cents,
            shipping_cents: row.shipping_cents,
            total_cents: row.total_cents,
            cash_given_cents: row.cash_given_cents,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn rows_to_orders(rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    /// Every order, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql).fetch_all(&self.pool).await?;
        rows_to_orders(rows)
    }

    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        rows_to_orders(rows)
    }

    pub async fn list_by_store(&self, store_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = ?1 ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;
        rows_to_orders(rows)
    }

    /// Orders of a store created within `[start, end]`, oldest first.
    pub async fn list_by_store_between(
        &self,
        store_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = ?1 AND created_at >= ?2 AND created_at <= ?3 ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(store_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        rows_to_orders(rows)
    }

    pub async fn insert(&self, order: &Order) -> DbResult<Order> {
        debug!(id = %order.id, items = order.items.len(), "Inserting order");

        let items_json = serde_json::to_string(&order.items).map_err(|e| DbError::Internal(e.to_string()))?;
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_first_name, customer_last_name, customer_email, customer_phone,
                ship_address, ship_city, ship_state, ship_zip_code, payment_method_id,
                items_json, store_id, store_name, user_id, total_cost_cents, subtotal_cents,
                shipping_cents, total_cents, cash_given_cents, status, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer.first_name)
        .bind(&order.customer.last_name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.shipping_address.address)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.zip_code)
        .bind(&order.payment_method_id)
        .bind(&items_json)
        .bind(&order.store_id)
        .bind(&order.store_name)
        .bind(&order.user_id)
        .bind(order.total_cost_cents)
        .bind(order.subtotal_cents)
        .bind(order.shipping_cents)
        .bind(order.total_cents)
        .bind(order.cash_given_cents)
        .bind(order.status)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(order.clone())
    }

    /// Persists the mutable fields of an order (everything except the line
    /// items, ownership and `created_at`).
    pub async fn save(&self, order: &Order) -> DbResult<Order> {
        debug!(id = %order.id, status = %order.status, "Saving order");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                customer_first_name = ?2, customer_last_name = ?3, customer_email = ?4,
                customer_phone = ?5, ship_address = ?6, ship_city = ?7, ship_state = ?8,
                ship_zip_code = ?9, payment_method_id = ?10, store_name = ?11,
                total_cost_cents = ?12, subtotal_cents = ?13, shipping_cents = ?14,
                total_cents = ?15, cash_given_cents = ?16, status = ?17, updated_at = ?18
            WHERE id = ?1
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer.first_name)
        .bind(&order.customer.last_name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.shipping_address.address)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.zip_code)
        .bind(&order.payment_method_id)
        .bind(&order.store_name)
        .bind(order.total_cost_cents)
        .bind(order.subtotal_cents)
        .bind(order.shipping_cents)
        .bind(order.total_cents)
        .bind(order.cash_given_cents)
        .bind(order.status)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order.id));
        }

        Ok(order.clone())
    }

    /// Moves an order into `shipped` in one statement unless it is already
    /// there. Returns `false` when the order is missing or already shipped.
    pub async fn claim_shipment(&self, id: &str, at: DateTime<Utc>) -> DbResult<bool> {
        let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status != ?2")
            .bind(id)
            .bind(OrderStatus::Shipped)
            .bind(at)
            .execute(&self.pool)
            .await?;

        let claimed = result.rows_affected() == 1;
        debug!(id = %id, claimed, "Claimed shipment");
        Ok(claimed)
    }

    /// Puts a claimed order back to `status` if it is still `shipped`.
    pub async fn release_shipment(&self, id: &str, status: OrderStatus, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4")
            .bind(id)
            .bind(status)
            .bind(at)
            .bind(OrderStatus::Shipped)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, status = %status, "Released shipment");
        Ok(())
    }
}
