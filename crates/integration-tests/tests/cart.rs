//! Cart and checkout flows.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use dyf_core::Role;
use dyf_integration_tests::TestApp;
use dyf_storefront::db::OrderRepository;

#[tokio::test]
async fn test_cart_add_increment_decrement() {
    let app = TestApp::new();
    app.seed_product("taladro-01", "Taladro percutor", 45_990).await;
    let mut client = app.client();

    let added = client
        .post("/cart/add", &[("product_id", "taladro-01")])
        .await;
    assert_eq!(added.status, StatusCode::SEE_OTHER);
    assert_eq!(added.location.as_deref(), Some("/"));

    let home = client.get("/").await;
    assert!(home.body.contains("Taladro percutor ha sido agregado al carrito"));
    assert!(home.body.contains("Total: <strong>$45.990</strong>"));

    client
        .post("/cart/increment", &[("product_id", "taladro-01")])
        .await;
    let home = client.get("/").await;
    assert!(home.body.contains("Total: <strong>$91.980</strong>"));

    client
        .post("/cart/decrement", &[("product_id", "taladro-01")])
        .await;
    client
        .post("/cart/decrement", &[("product_id", "taladro-01")])
        .await;
    let home = client.get("/").await;
    assert!(home.body.contains("Tu carrito está vacío."));
}

#[tokio::test]
async fn test_cart_add_unknown_product_is_not_found() {
    let app = TestApp::new();
    let mut client = app.client();

    let response = client.post("/cart/add", &[("product_id", "fantasma")]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_is_per_session() {
    let app = TestApp::new();
    app.seed_product("martillo-02", "Martillo", 8_990).await;
    let mut first = app.client();
    let mut second = app.client();

    first
        .post("/cart/add", &[("product_id", "martillo-02")])
        .await;

    assert!(first.get("/").await.body.contains("$8.990</strong>"));
    assert!(second.get("/").await.body.contains("Tu carrito está vacío."));
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let app = TestApp::new();
    app.seed_product("martillo-02", "Martillo", 8_990).await;
    let mut client = app.client();
    client
        .post("/cart/add", &[("product_id", "martillo-02")])
        .await;

    let response = client.post("/cart/checkout", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/auth/login"));
    assert!(OrderRepository::new(app.store()).list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    let mut client = app.client();
    client.login("ana@dyf.cl").await;

    let response = client.post("/cart/checkout", &[]).await;
    assert_eq!(response.location.as_deref(), Some("/"));
    assert!(client.get("/").await.body.contains("El carrito está vacío"));
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    app.seed_user("beto@dyf.cl", "22.222.222-2", "Beto", Role::Customer)
        .await;
    app.seed_product("taladro-01", "Taladro percutor", 45_990).await;
    app.seed_product("martillo-02", "Martillo", 8_990).await;

    // Cart survives login.
    let mut ana = app.client();
    ana.post("/cart/add", &[("product_id", "taladro-01")]).await;
    ana.post("/cart/add", &[("product_id", "martillo-02")]).await;
    ana.post("/cart/add", &[("product_id", "martillo-02")]).await;
    ana.login("ana@dyf.cl").await;

    let response = ana.post("/cart/checkout", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/account/orders"));

    let orders = ana.get("/account/orders").await;
    assert_eq!(orders.status, StatusCode::OK);
    assert!(orders.body.contains("Taladro percutor"));
    assert!(orders.body.contains("$63.970"));
    assert!(orders.body.contains("Pendiente"));
    assert!(ana.get("/").await.body.contains("Tu carrito está vacío."));

    let mut beto = app.client();
    beto.login("beto@dyf.cl").await;
    let orders = beto.get("/account/orders").await;
    assert!(orders.body.contains("Aún no has realizado pedidos."));

    let stored = OrderRepository::new(app.store()).list_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.first().unwrap().item_count(), 3);
}
