//! Sign-up, login, logout and profile flows.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use dyf_core::Role;
use dyf_integration_tests::{PASSWORD, TestApp};

fn sign_up_fields<'a>(email: &'a str, rut: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("rut", rut),
        ("name", "Ana Pérez"),
        ("email", email),
        ("password", PASSWORD),
        ("confirm_password", PASSWORD),
        ("phone", "912345678"),
        ("shipping_address", "Av. Siempre Viva 742"),
    ]
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();
    let mut client = app.client();

    let response = client
        .post("/auth/register", &sign_up_fields("ana@dyf.cl", "11.111.111-1"))
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location.as_deref(), Some("/auth/login"));

    let page = client.get("/auth/login").await;
    assert!(page.body.contains("tu información ha sido guardada exitosamente"));

    client.login("ana@dyf.cl").await;
    let home = client.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Bienvenido, Ana Pérez"));
}

#[tokio::test]
async fn test_register_duplicate_email_rerenders_form() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    let mut client = app.client();

    let response = client
        .post("/auth/register", &sign_up_fields("ANA@dyf.cl", "22.222.222-2"))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Este correo ya está registrado"));
}

#[tokio::test]
async fn test_register_weak_password_is_rejected() {
    let app = TestApp::new();
    let mut client = app.client();

    let mut fields = sign_up_fields("ana@dyf.cl", "11.111.111-1");
    for field in &mut fields {
        if field.0 == "password" || field.0 == "confirm_password" {
            field.1 = "abc";
        }
    }
    let response = client.post("/auth/register", &fields).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("field-error"));
}

#[tokio::test]
async fn test_login_reports_unregistered_email() {
    let app = TestApp::new();
    let mut client = app.client();

    let response = client
        .post(
            "/auth/login",
            &[("email", "nadie@dyf.cl"), ("password", PASSWORD)],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("El correo ingresado no está registrado"));
    assert!(response.body.contains("nadie@dyf.cl"));
}

#[tokio::test]
async fn test_login_reports_incorrect_password() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    let mut client = app.client();

    let response = client
        .post(
            "/auth/login",
            &[("email", "ana@dyf.cl"), ("password", "Otra123$")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("La contraseña ingresada es incorrecta"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    let mut client = app.client();
    client.login("ana@dyf.cl").await;

    assert_eq!(client.get("/account/profile").await.status, StatusCode::OK);

    let response = client.post("/auth/logout", &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let profile = client.get("/account/profile").await;
    assert_eq!(profile.status, StatusCode::SEE_OTHER);
    assert_eq!(profile.location.as_deref(), Some("/auth/login"));
}

#[tokio::test]
async fn test_change_password_request() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    let mut client = app.client();

    let sent = client
        .post("/auth/change-password", &[("email", "ana@dyf.cl")])
        .await;
    assert_eq!(sent.status, StatusCode::OK);

    let unknown = client
        .post("/auth/change-password", &[("email", "nadie@dyf.cl")])
        .await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert!(unknown.body.contains("no está registrado"));
    assert_ne!(sent.body, unknown.body);

    let invalid = client
        .post("/auth/change-password", &[("email", "no-es-correo")])
        .await;
    assert_eq!(invalid.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_profile_update_with_blank_password_keeps_login() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    let mut client = app.client();
    client.login("ana@dyf.cl").await;

    let response = client
        .post(
            "/account/profile",
            &[
                ("rut", "11.111.111-1"),
                ("name", "Ana María"),
                ("password", ""),
                ("confirm_password", ""),
                ("phone", "987654321"),
                ("shipping_address", "Los Aromos 12"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let profile = client.get("/account/profile").await;
    assert!(profile.body.contains("Datos actualizados con éxito."));
    assert!(profile.body.contains("Ana María"));
    assert!(profile.body.contains("Los Aromos 12"));

    client.post("/auth/logout", &[]).await;
    client.login("ana@dyf.cl").await;
}

#[tokio::test]
async fn test_profile_rejects_taken_rut() {
    let app = TestApp::new();
    app.seed_user("ana@dyf.cl", "11.111.111-1", "Ana", Role::Customer)
        .await;
    app.seed_user("beto@dyf.cl", "22.222.222-2", "Beto", Role::Customer)
        .await;
    let mut client = app.client();
    client.login("ana@dyf.cl").await;

    let response = client
        .post(
            "/account/profile",
            &[
                ("rut", "22.222.222-2"),
                ("name", "Ana"),
                ("phone", "912345678"),
                ("shipping_address", "Av. Siempre Viva 742"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Este RUT ya está registrado"));
}
