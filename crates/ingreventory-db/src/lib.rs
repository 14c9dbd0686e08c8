//! # ingreventory-db: Database Layer for Ingreventory
//!
//! SQLite storage for stores, users, the catalog, ingredient stock, orders
//! and cash flows, accessed through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Ingreventory Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (PUT /api/orders/:id/ship)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DeductionEngine (ingreventory-fulfillment)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                ingreventory-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ IngredientRepo │    │ 001_init.sql │  │   │
//! │  │   │               │    │ OrderRepo ...  │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (or `sqlite::memory:` in tests)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per aggregate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ingreventory_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ingreventory.db")).await?;
//! let remaining = db.ingredients().decrement_stock(&flour_id, 6).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::{
    generate_id, CashflowRepository, CategoryRepository, IngredientRepository, OrderRepository,
    PaymentSettingRepository, ProductRepository, StoreRepository, UserCredentials, UserRepository,
};

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use ingreventory_core::validation::slugify;
    use ingreventory_core::{
        BusinessType, Category, Customer, Ingredient, LineItem, Order, OrderStatus, Product,
        ShippingAddress, Store, StoreAddress, User, UserRole,
    };

    use crate::repository::generate_id;
    use crate::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database")
    }

    pub fn sample_store(name: &str) -> Store {
        let now = Utc::now();
        Store {
            id: generate_id(),
            name: name.to_string(),
            slug: slugify(name),
            address: StoreAddress::default(),
            currency: "$".to_string(),
            currency_code: "USD".to_string(),
            phone: "555-0100".to_string(),
            email: format!("{}@stores.test", slugify(name)),
            business_type: BusinessType::Cafe,
            tax_id: None,
            background_image: None,
            logo_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sample_user(email: &str, role: UserRole, store_id: Option<&str>) -> User {
        User {
            id: generate_id(),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
            store_id: store_id.map(str::to_string),
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    pub fn sample_category(store_id: &str, name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: generate_id(),
            store_id: store_id.to_string(),
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            is_active: true,
            product_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sample_product(store_id: &str, category_id: &str, name: &str) -> Product {
        let mut product = Product::new(store_id, category_id, name);
        product.id = generate_id();
        product.price_cents = 450;
        product.cost_cents = 150;
        product
    }

    pub fn sample_ingredient(store_id: &str, name: &str, stock: i64) -> Ingredient {
        Ingredient {
            id: generate_id(),
            store_id: store_id.to_string(),
            name: name.to_string(),
            description: None,
            unit: "g".to_string(),
            stock,
            price_per_unit_cents: 2,
            markup_bps: 0,
            created_at: Utc::now(),
            last_restocked: None,
        }
    }

    pub fn sample_order(store_id: Option<&str>, user_id: Option<&str>) -> Order {
        let now = Utc::now();
        Order {
            id: generate_id(),
            customer: Customer {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.test".to_string(),
                phone: "555-0199".to_string(),
            },
            shipping_address: ShippingAddress {
                address: "1 Analytical Way".to_string(),
                city: "London".to_string(),
                state: "LDN".to_string(),
                zip_code: "N1".to_string(),
            },
            payment_method_id: Some("cash".to_string()),
            items: vec![LineItem {
                product_id: generate_id(),
                name: "Latte".to_string(),
                price_cents: 450,
                quantity: 2,
                subtotal_cents: 900,
                addons: Vec::new(),
            }],
            store_id: store_id.map(str::to_string),
            store_name: None,
            user_id: user_id.map(str::to_string),
            total_cost_cents: 300,
            subtotal_cents: 900,
            shipping_cents: 0,
            total_cents: 900,
            cash_given_cents: None,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
