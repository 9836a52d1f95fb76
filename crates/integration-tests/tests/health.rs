//! Health endpoints and response headers.

use axum::http::StatusCode;
use dyf_integration_tests::TestApp;

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let mut client = app.client();

    let live = client.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    assert_eq!(client.get("/health/ready").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::new();
    let mut client = app.client();

    assert_eq!(client.get("/no-existe").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_home_renders_empty_catalog() {
    let app = TestApp::new();
    let mut client = app.client();

    let home = client.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("No hay productos disponibles."));
}
