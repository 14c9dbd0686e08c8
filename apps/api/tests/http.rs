//! End-to-end requests against the router with an in-memory database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use ingreventory_api::{build_router, ApiConfig, AppState};
use ingreventory_db::{Database, DbConfig};

struct TestApp {
    router: Router,
    db: Database,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db.clone(), ApiConfig::for_tests()).unwrap();
        TestApp {
            router: build_router(state),
            db,
        }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    /// Registers a store owner and returns `(token, store_id)`.
    async fn register(&self, store_name: &str, email: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "email": email,
                    "password": "secret123",
                    "firstName": "Owner",
                    "lastName": "One",
                    "storeName": store_name,
                    "businessType": "cafe",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");

        let token = body["data"]["token"].as_str().unwrap().to_string();
        let store_id = body["data"]["store"]["id"].as_str().unwrap().to_string();
        (token, store_id)
    }

    async fn create_ingredient(&self, token: &str, store_id: &str, name: &str, stock: i64) -> String {
        let (status, body) = self
            .post(
                "/api/ingredients",
                Some(token),
                json!({ "name": name, "storeId": store_id, "stock": stock, "unit": "g" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_category(&self, token: &str, store_id: &str, name: &str) -> (StatusCode, Value) {
        self.post(
            "/api/categories",
            Some(token),
            json!({ "name": name, "storeId": store_id }),
        )
        .await
    }

    async fn create_product(&self, token: &str, store_id: &str, category_id: &str, recipe: Value) -> String {
        let (status, body) = self
            .post(
                &format!("/api/products/{store_id}"),
                Some(token),
                json!({
                    "name": "Latte",
                    "categoryId": category_id,
                    "priceCents": 450,
                    "costCents": 150,
                    "ingredients": recipe,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

fn order_body(store_id: &str, product_id: &str, quantity: i64) -> Value {
    json!({
        "customer": {
            "firstName": "Ana",
            "lastName": "Cruz",
            "email": "ana@example.com",
            "phone": "0917"
        },
        "shippingAddress": {
            "address": "1 Main St",
            "city": "Makati",
            "state": "NCR",
            "zipCode": "1200"
        },
        "items": [{
            "productId": product_id,
            "name": "Latte",
            "priceCents": 450,
            "quantity": quantity,
            "subtotalCents": 450 * quantity
        }],
        "storeId": store_id,
        "totalCostCents": 150 * quantity,
        "subtotalCents": 450 * quantity,
        "shippingCents": 0,
        "totalCents": 450 * quantity
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_shipping_an_order_deducts_ingredients() {
    let app = TestApp::new().await;
    let (token, store_id) = app.register("Bean There", "owner@bean.test").await;

    let beans = app.create_ingredient(&token, &store_id, "Beans", 1000).await;
    let (_, category) = app.create_category(&token, &store_id, "Coffee").await;
    let category_id = category["data"]["id"].as_str().unwrap();
    let latte = app
        .create_product(&token, &store_id, category_id, json!([{ "ingredient": beans, "count": 18 }]))
        .await;

    let (status, created) = app.post("/api/order", None, order_body(&store_id, &latte, 2)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["data"]["status"], "pending");
    let order_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, shipped) = app
        .send(
            Method::PATCH,
            &format!("/api/order/{order_id}/status"),
            Some(&token),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{shipped}");
    assert_eq!(shipped["data"]["status"], "shipped");

    let (_, ingredient) = app.get(&format!("/api/ingredients/{beans}"), None).await;
    assert_eq!(ingredient["data"]["stock"], 964);

    // Shipping again is a no-op.
    app.send(
        Method::PATCH,
        &format!("/api/order/{order_id}/status"),
        Some(&token),
        Some(json!({ "status": "shipped" })),
    )
    .await;
    let (_, ingredient) = app.get(&format!("/api/ingredients/{beans}"), None).await;
    assert_eq!(ingredient["data"]["stock"], 964);

    let (_, product) = app.get(&format!("/api/products/{latte}"), None).await;
    assert_eq!(product["data"]["inStock"], true);
}

#[tokio::test]
async fn test_generic_patch_to_shipped_never_deducts() {
    let app = TestApp::new().await;
    let (token, store_id) = app.register("Patch Roasters", "owner@patch.test").await;

    let beans = app.create_ingredient(&token, &store_id, "Beans", 36).await;
    let (_, category) = app.create_category(&token, &store_id, "Coffee").await;
    let category_id = category["data"]["id"].as_str().unwrap();
    let latte = app
        .create_product(&token, &store_id, category_id, json!([{ "ingredient": beans, "count": 18 }]))
        .await;

    let (_, created) = app.post("/api/order", None, order_body(&store_id, &latte, 2)).await;
    let order_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, patched) = app
        .send(
            Method::PATCH,
            &format!("/api/orders/{order_id}"),
            Some(&token),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{patched}");
    assert_eq!(patched["data"]["status"], "shipped");

    let (_, ingredient) = app.get(&format!("/api/ingredients/{beans}"), None).await;
    assert_eq!(ingredient["data"]["stock"], 36);
    let (_, product) = app.get(&format!("/api/products/{latte}"), None).await;
    assert_eq!(product["data"]["inStock"], true);

    // Already shipped, so the deducting route does nothing either.
    let (status, shipped) = app
        .send(
            Method::PATCH,
            &format!("/api/order/{order_id}/status"),
            Some(&token),
            Some(json!({ "status": "shipped" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{shipped}");
    assert_eq!(shipped["data"]["status"], "shipped");
    assert_eq!(shipped["message"], "Order status updated successfully");

    let (_, ingredient) = app.get(&format!("/api/ingredients/{beans}"), None).await;
    assert_eq!(ingredient["data"]["stock"], 36);
    let (_, product) = app.get(&format!("/api/products/{latte}"), None).await;
    assert_eq!(product["data"]["inStock"], true);
}

#[tokio::test]
async fn test_status_change_of_unknown_order_is_not_found() {
    let app = TestApp::new().await;
    let (token, _) = app.register("Corner Cafe", "owner@corner.test").await;

    let (status, body) = app
        .send(
            Method::PATCH,
            "/api/order/does-not-exist/status",
            Some(&token),
            Some(json!({ "status": "shipped" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_mutations_require_a_token() {
    let app = TestApp::new().await;
    let (_, store_id) = app.register("Locked Bakery", "owner@locked.test").await;

    let (status, body) = app
        .post("/api/ingredients", None, json!({ "name": "Flour", "storeId": store_id }))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_staff_cannot_touch_another_store() {
    let app = TestApp::new().await;
    let (token_a, store_a) = app.register("Store A", "a@stores.test").await;
    let (token_b, _) = app.register("Store B", "b@stores.test").await;

    let flour = app.create_ingredient(&token_a, &store_a, "Flour", 50).await;

    let (status, _) = app
        .send(
            Method::PUT,
            &format!("/api/ingredients/{flour}"),
            Some(&token_b),
            Some(json!({ "stock": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_category_slug_is_rejected() {
    let app = TestApp::new().await;
    let (token, store_id) = app.register("Slug Shop", "owner@slug.test").await;

    let (status, _) = app.create_category(&token, &store_id, "Hot Drinks").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.create_category(&token, &store_id, "hot drinks").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_cart_check_reports_shortfalls() {
    let app = TestApp::new().await;
    let (token, store_id) = app.register("Short Stock", "owner@short.test").await;

    let milk = app.create_ingredient(&token, &store_id, "Milk", 10).await;
    let (_, category) = app.create_category(&token, &store_id, "Coffee").await;
    let category_id = category["data"]["id"].as_str().unwrap();
    let latte = app
        .create_product(&token, &store_id, category_id, json!([{ "ingredient": milk, "count": 18 }]))
        .await;

    let (status, body) = app
        .post(
            "/api/cart/check-ingredients",
            None,
            json!({ "items": [{ "productId": latte, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let shortfall = &body["insufficientIngredients"][0];
    assert_eq!(shortfall["ingredientName"], "Milk");
    assert_eq!(shortfall["required"], 18);
    assert_eq!(shortfall["available"], 10);

    let (status, _) = app
        .post(
            "/api/cart/check-ingredients",
            None,
            json!({ "items": [{ "productId": "missing", "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new().await;
    app.register("Reset Cafe", "owner@reset.test").await;

    let (status, _) = app
        .post("/api/auth/forgot-password", None, json!({ "email": "owner@reset.test" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let code = app
        .db
        .users()
        .credentials_by_email("owner@reset.test")
        .await
        .unwrap()
        .unwrap()
        .reset_code
        .unwrap();

    let (status, _) = app
        .post(
            "/api/auth/reset-password",
            None,
            json!({ "email": "owner@reset.test", "code": "000000x", "newPassword": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/auth/reset-password",
            None,
            json!({ "email": "owner@reset.test", "code": code, "newPassword": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "owner@reset.test", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "owner@reset.test", "password": "newsecret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].as_str().is_some());
}

#[tokio::test]
async fn test_cashflow_summary() {
    let app = TestApp::new().await;
    let (token, store_id) = app.register("Till Shop", "owner@till.test").await;

    let beans = app.create_ingredient(&token, &store_id, "Beans", 1000).await;
    let (_, category) = app.create_category(&token, &store_id, "Coffee").await;
    let category_id = category["data"]["id"].as_str().unwrap();
    let latte = app
        .create_product(&token, &store_id, category_id, json!([{ "ingredient": beans, "count": 18 }]))
        .await;
    app.post("/api/order", None, order_body(&store_id, &latte, 2)).await;

    for (flow_type, amount) in [("in", 5000), ("out", 1200)] {
        let (status, body) = app
            .post(
                "/api/cashflow",
                Some(&token),
                json!({ "type": flow_type, "amountCents": amount, "storeId": store_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, body) = app
        .get(&format!("/api/cashflow/summary?storeId={store_id}"), Some(&token))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let summary = &body["data"]["summary"];
    assert_eq!(summary["totalSales"], 900);
    assert_eq!(summary["totalCost"], 300);
    assert_eq!(summary["cashIn"], 5000);
    assert_eq!(summary["cashOut"], 1200);
    assert_eq!(summary["net"], 900 + 5000 - 1200);
    assert_eq!(body["data"]["cashflows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_payment_settings_default_then_save() {
    let app = TestApp::new().await;
    let (token, store_id) = app.register("Pay Shop", "owner@pay.test").await;

    let (status, body) = app.get(&format!("/api/payments?storeId={store_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["options"], json!([]));

    let (status, body) = app
        .post(
            "/api/payments",
            Some(&token),
            json!({
                "storeId": store_id,
                "options": [{ "key": "cash", "enabled": true }],
                "customMethods": [{ "name": "GCash", "enabled": false }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["options"][0]["key"], "cash");

    let (status, _) = app.get("/api/payments", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
