//! Deduction engine behaviour against the in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use ingreventory_core::recipe::RequirementSource;
use ingreventory_core::{
    Addon, AddonType, Customer, Ingredient, LineItem, Order, OrderStatus, Product, RecipeEntry,
    SelectedAddon, ShippingAddress,
};
use ingreventory_fulfillment::{
    DeductionEngine, DeductionMode, FulfillmentError, MemoryStores, OrderStore, StoreResult,
};

// =============================================================================
// Fixtures
// =============================================================================

const STORE: &str = "store-1";

fn engine(stores: &Arc<MemoryStores>, mode: DeductionMode) -> DeductionEngine {
    DeductionEngine::new(stores.clone(), stores.clone(), stores.clone(), mode)
}

fn ingredient(id: &str, stock: i64) -> Ingredient {
    Ingredient {
        id: id.to_string(),
        store_id: STORE.to_string(),
        name: id.to_string(),
        description: None,
        unit: "g".to_string(),
        stock,
        price_per_unit_cents: 1,
        markup_bps: 0,
        created_at: Utc::now(),
        last_restocked: None,
    }
}

fn product(id: &str, recipe: &[(&str, i64)]) -> Product {
    let mut product = Product::new(STORE, "cat-1", id);
    product.id = id.to_string();
    product.ingredients = recipe
        .iter()
        .map(|(ingredient_id, count)| RecipeEntry {
            ingredient_id: ingredient_id.to_string(),
            count: *count,
        })
        .collect();
    product
}

fn with_addon(mut product: Product, label: &str, ingredient_id: &str, quantity: i64) -> Product {
    product.addon_types.push(AddonType {
        label: "Extras".to_string(),
    });
    product.addons.push(Addon {
        addon_type: "Extras".to_string(),
        label: label.to_string(),
        ingredient_id: ingredient_id.to_string(),
        quantity,
        cost_cents: 0,
        price_cents: 50,
    });
    product
}

fn line(product_id: &str, quantity: i64, addons: &[&str]) -> LineItem {
    LineItem {
        product_id: product_id.to_string(),
        name: product_id.to_string(),
        price_cents: 100,
        quantity,
        subtotal_cents: 100 * quantity,
        addons: addons
            .iter()
            .map(|label| SelectedAddon {
                label: label.to_string(),
                price_cents: 50,
            })
            .collect(),
    }
}

fn order(id: &str, status: OrderStatus, items: Vec<LineItem>) -> Order {
    let now = Utc::now();
    Order {
        id: id.to_string(),
        customer: Customer::default(),
        shipping_address: ShippingAddress::default(),
        payment_method_id: None,
        items,
        store_id: Some(STORE.to_string()),
        store_name: None,
        user_id: None,
        total_cost_cents: 0,
        subtotal_cents: 0,
        shipping_cents: 0,
        total_cents: 0,
        cash_given_cents: None,
        status,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Quantity and Add-on Resolution
// =============================================================================

#[tokio::test]
async fn test_count_times_quantity_is_deducted() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("bread", &[("flour", 2)])).await;
    stores
        .put_order(order("o1", OrderStatus::Processing, vec![line("bread", 3, &[])]))
        .await;

    let outcome = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(stores.stock("flour").await, Some(4));
    assert_eq!(outcome.order.status, OrderStatus::Shipped);
    assert_eq!(outcome.deducted.len(), 1);
    assert_eq!(outcome.deducted[0].amount, 6);
    assert_eq!(outcome.deducted[0].new_stock, 4);
    assert_eq!(stores.order("o1").await.unwrap().status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_addon_quantity_is_not_scaled_by_line_quantity() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("bun", 100)).await;
    stores.put_ingredient(ingredient("cheese", 20)).await;
    stores
        .put_product(with_addon(product("burger", &[("bun", 1)]), "Extra Cheese", "cheese", 1))
        .await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("burger", 3, &["Extra Cheese"])]))
        .await;

    let outcome = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(stores.stock("bun").await, Some(97));
    assert_eq!(stores.stock("cheese").await, Some(19));
    assert_eq!(
        outcome.deducted[1].source,
        RequirementSource::Addon("Extra Cheese".to_string())
    );
}

#[tokio::test]
async fn test_unknown_addon_leaves_order_and_stock_untouched() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("bun", 100)).await;
    stores
        .put_product(with_addon(product("burger", &[("bun", 1)]), "Bacon", "bun", 1))
        .await;
    stores
        .put_order(order("o1", OrderStatus::Processing, vec![line("burger", 1, &["Truffle"])]))
        .await;

    let err = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap_err();

    match err {
        FulfillmentError::UnknownAddon { label, line, .. } => {
            assert_eq!(label, "Truffle");
            assert_eq!(line, 0);
        }
        other => panic!("expected UnknownAddon, got {other:?}"),
    }
    assert_eq!(stores.stock("bun").await, Some(100));
    assert_eq!(stores.order("o1").await.unwrap().status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_invalid_line_quantity_is_rejected() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("bread", &[("flour", 1)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("bread", 0, &[])]))
        .await;

    let err = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(stores.stock("flour").await, Some(10));
}

#[tokio::test]
async fn test_overflowing_recipe_amount_is_rejected_before_deduction() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("salt", 10)).await;
    stores.put_product(product("brine", &[("salt", i64::MAX / 2)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("brine", 3, &[])]))
        .await;

    let err = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap_err();

    assert!(err.is_invalid_input());
    assert_eq!(stores.stock("salt").await, Some(10));
    assert_eq!(stores.order("o1").await.unwrap().status, OrderStatus::Pending);
}

// =============================================================================
// State Machine
// =============================================================================

#[tokio::test]
async fn test_shipping_twice_deducts_once() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("bread", &[("flour", 2)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("bread", 1, &[])]))
        .await;
    let engine = engine(&stores, DeductionMode::Sequential);

    engine.transition("o1", OrderStatus::Shipped).await.unwrap();
    let again = engine.transition("o1", OrderStatus::Shipped).await.unwrap();

    assert!(!again.deducted_stock());
    assert!(again.stocked_out.is_empty());
    assert_eq!(stores.stock("flour").await, Some(8));
}

/// Order store whose reads lag, so concurrent transitions both see the
/// order before either has written it.
struct LaggingOrders(Arc<MemoryStores>);

#[async_trait]
impl OrderStore for LaggingOrders {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Order>> {
        let order = OrderStore::find_by_id(self.0.as_ref(), id).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        order
    }

    async fn save(&self, order: &Order) -> StoreResult<Order> {
        self.0.save(order).await
    }

    async fn claim_shipment(&self, id: &str) -> StoreResult<bool> {
        self.0.claim_shipment(id).await
    }

    async fn release_shipment(&self, id: &str, status: OrderStatus) -> StoreResult<()> {
        self.0.release_shipment(id, status).await
    }
}

#[tokio::test]
async fn test_concurrent_shipments_of_one_order_deduct_once() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("patty", 10)).await;
    stores.put_product(product("burger", &[("patty", 1)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("burger", 3, &[])]))
        .await;
    let engine = DeductionEngine::new(
        Arc::new(LaggingOrders(stores.clone())),
        stores.clone(),
        stores.clone(),
        DeductionMode::Sequential,
    );

    let (a, b) = tokio::join!(
        engine.transition("o1", OrderStatus::Shipped),
        engine.transition("o1", OrderStatus::Shipped)
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.deducted.len() + b.deducted.len(), 1);
    assert_eq!(stores.stock("patty").await, Some(7));
    assert_eq!(stores.order("o1").await.unwrap().status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_other_transitions_never_touch_stock() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("bread", &[("flour", 1)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("bread", 1, &[])]))
        .await;
    let engine = engine(&stores, DeductionMode::Sequential);

    engine.transition("o1", OrderStatus::Processing).await.unwrap();
    assert_eq!(stores.stock("flour").await, Some(10));

    engine.transition("o1", OrderStatus::Shipped).await.unwrap();
    let delivered = engine.transition("o1", OrderStatus::Delivered).await.unwrap();
    assert_eq!(delivered.order.status, OrderStatus::Delivered);
    assert_eq!(stores.stock("flour").await, Some(9));

    let cancelled = engine.transition("o1", OrderStatus::Cancelled).await.unwrap();
    assert!(!cancelled.deducted_stock());
    assert_eq!(stores.stock("flour").await, Some(9));
}

#[tokio::test]
async fn test_reentering_shipped_deducts_again() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("bread", &[("flour", 1)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("bread", 1, &[])]))
        .await;
    let engine = engine(&stores, DeductionMode::Sequential);

    engine.transition("o1", OrderStatus::Shipped).await.unwrap();
    engine.transition("o1", OrderStatus::Delivered).await.unwrap();
    engine.transition("o1", OrderStatus::Shipped).await.unwrap();

    assert_eq!(stores.stock("flour").await, Some(8));
}

#[tokio::test]
async fn test_missing_order() {
    let stores = Arc::new(MemoryStores::new());
    let err = engine(&stores, DeductionMode::Sequential)
        .transition("nope", OrderStatus::Shipped)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

// =============================================================================
// Stock-out Propagation
// =============================================================================

#[tokio::test]
async fn test_base_ingredient_reaching_zero_clears_in_stock() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("patty", 6)).await;
    stores.put_product(product("burger", &[("patty", 2)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("burger", 3, &[])]))
        .await;

    let outcome = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(stores.stock("patty").await, Some(0));
    assert!(!stores.product("burger").await.unwrap().in_stock);
    assert_eq!(outcome.stocked_out, vec!["burger".to_string()]);
}

#[tokio::test]
async fn test_positive_remaining_stock_keeps_in_stock() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("patty", 7)).await;
    stores.put_product(product("burger", &[("patty", 2)])).await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("burger", 3, &[])]))
        .await;

    let outcome = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(stores.stock("patty").await, Some(1));
    assert!(stores.product("burger").await.unwrap().in_stock);
    assert!(outcome.stocked_out.is_empty());
}

#[tokio::test]
async fn test_addon_only_ingredient_running_out_keeps_in_stock() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("bun", 50)).await;
    stores.put_ingredient(ingredient("bacon", 1)).await;
    stores
        .put_product(with_addon(product("burger", &[("bun", 1)]), "Bacon", "bacon", 1))
        .await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("burger", 1, &["Bacon"])]))
        .await;

    engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap();

    assert_eq!(stores.stock("bacon").await, Some(0));
    assert!(stores.product("burger").await.unwrap().in_stock);
}

// =============================================================================
// Referential Integrity
// =============================================================================

#[tokio::test]
async fn test_deleted_product_aborts_before_any_decrement() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("bread", &[("flour", 2)])).await;
    stores.put_product(product("cake", &[("flour", 3)])).await;
    stores
        .put_order(order(
            "o1",
            OrderStatus::Processing,
            vec![line("bread", 1, &[]), line("cake", 1, &[])],
        ))
        .await;
    stores.remove_product("cake").await;

    let err = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap_err();

    match err {
        FulfillmentError::ProductNotFound { order_id, line, product_id } => {
            assert_eq!(order_id, "o1");
            assert_eq!(line, 1);
            assert_eq!(product_id, "cake");
        }
        other => panic!("expected ProductNotFound, got {other:?}"),
    }
    assert_eq!(stores.stock("flour").await, Some(10));
    assert_eq!(stores.order("o1").await.unwrap().status, OrderStatus::Processing);
}

#[tokio::test]
async fn test_missing_ingredient_leaves_earlier_decrements_in_sequential_mode() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("bread", &[("flour", 2)])).await;
    stores.put_product(product("cake", &[("sugar", 1)])).await;
    stores
        .put_order(order(
            "o1",
            OrderStatus::Pending,
            vec![line("bread", 1, &[]), line("cake", 1, &[])],
        ))
        .await;

    let err = engine(&stores, DeductionMode::Sequential)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap_err();

    match &err {
        FulfillmentError::Interrupted { applied, rolled_back, .. } => {
            assert!(!rolled_back);
            assert_eq!(applied.len(), 1);
            assert_eq!(applied[0].ingredient_id, "flour");
        }
        other => panic!("expected Interrupted, got {other:?}"),
    }
    assert!(matches!(
        err.root(),
        FulfillmentError::IngredientNotFound { ingredient_id, line: 1, .. } if ingredient_id == "sugar"
    ));
    assert_eq!(stores.stock("flour").await, Some(8));
    assert_eq!(stores.order("o1").await.unwrap().status, OrderStatus::Pending);
}

// =============================================================================
// Compensation
// =============================================================================

#[tokio::test]
async fn test_compensation_restores_stock_and_flags() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("patty", 2)).await;
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_product(product("burger", &[("patty", 2)])).await;
    stores
        .put_product(product("cake", &[("flour", 1), ("sugar", 1)]))
        .await;
    stores
        .put_order(order(
            "o1",
            OrderStatus::Pending,
            vec![line("burger", 1, &[]), line("cake", 1, &[])],
        ))
        .await;

    let err = engine(&stores, DeductionMode::Compensating)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap_err();

    match &err {
        FulfillmentError::Interrupted { applied, rolled_back, .. } => {
            assert!(rolled_back);
            assert_eq!(applied.len(), 2);
        }
        other => panic!("expected Interrupted, got {other:?}"),
    }
    assert_eq!(stores.stock("patty").await, Some(2));
    assert_eq!(stores.stock("flour").await, Some(10));
    assert!(stores.product("burger").await.unwrap().in_stock);
    assert_eq!(stores.order("o1").await.unwrap().status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_store_failure_is_reported_with_applied_decrements() {
    let stores = Arc::new(MemoryStores::new());
    stores.put_ingredient(ingredient("flour", 10)).await;
    stores.put_ingredient(ingredient("yeast", 10)).await;
    stores
        .put_product(product("bread", &[("flour", 2), ("yeast", 1)]))
        .await;
    stores
        .put_order(order("o1", OrderStatus::Pending, vec![line("bread", 1, &[])]))
        .await;
    stores.set_unavailable("yeast", true).await;

    let err = engine(&stores, DeductionMode::Compensating)
        .transition("o1", OrderStatus::Shipped)
        .await
        .unwrap_err();

    assert!(matches!(err.root(), FulfillmentError::Store(_)));
    assert_eq!(err.applied().len(), 1);
    assert_eq!(stores.stock("flour").await, Some(10));
    assert_eq!(stores.stock("yeast").await, Some(10));
}
