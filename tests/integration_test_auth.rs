//! End-to-end tests for registration, login and user administration.

mod common;

use axum::http::Method;
use serde_json::json;

use common::{body_json, spawn_app};

#[tokio::test]
async fn tenant_directory_lists_seeded_tenants() {
    let app = spawn_app().await;

    let response = app.request(Method::GET, "/auth/tenants", None, None).await;
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    let codes: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&"AURA"));
    assert!(codes.contains(&"SLM"));
}

#[tokio::test]
async fn login_returns_token_profile_and_branches() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "username": "admin@aura",
                "password": "Admin123!",
                "tenant_code": "AURA",
            })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert!(body["token"].as_str().unwrap().contains('.'));
    assert_eq!(body["role"], "Admin");
    assert_eq!(body["tenant_code"], "AURA");
    assert_eq!(body["branches"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn login_tenant_code_is_case_insensitive() {
    let app = spawn_app().await;
    app.login("admin@aura", "Admin123!", "aura").await;
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "username": "admin@aura",
                "password": "wrong-password",
                "tenant_code": "AURA",
            })),
        )
        .await;
    assert_eq!(response.status(), 401);
    assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_against_the_wrong_tenant_is_401() {
    let app = spawn_app().await;

    // Valid AURA credentials presented under the SLM tenant
    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "username": "admin@aura",
                "password": "Admin123!",
                "tenant_code": "SLM",
            })),
        )
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn login_with_unknown_tenant_code_is_400() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "username": "admin@aura",
                "password": "Admin123!",
                "tenant_code": "NOPE",
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(body_json(response).await["code"], "INVALID_TENANT");
}

#[tokio::test]
async fn register_creates_viewer_who_can_login() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "newbie@aura",
                "password": "Newbie123!",
                "tenant_code": "aura",
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body = body_json(response).await;
    assert_eq!(body["role"], "Viewer");
    assert_eq!(body["full_name"], "newbie@aura");
    assert!(body.get("password_hash").is_none());

    app.login("newbie@aura", "Newbie123!", "AURA").await;
}

#[tokio::test]
async fn register_duplicate_username_is_409() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "admin@aura",
                "password": "Whatever123!",
                "tenant_code": "AURA",
            })),
        )
        .await;
    assert_eq!(response.status(), 409);
    assert_eq!(body_json(response).await["code"], "USERNAME_EXISTS");
}

#[tokio::test]
async fn register_with_unknown_tenant_is_400() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "ghost@nowhere",
                "password": "Ghost123!",
                "tenant_code": "NOPE",
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn missing_or_garbage_token_is_401_never_403() {
    let app = spawn_app().await;

    let response = app.request(Method::GET, "/patients", None, None).await;
    assert_eq!(response.status(), 401);
    assert_eq!(body_json(response).await["code"], "UNAUTHENTICATED");

    let response = app
        .request(Method::GET, "/patients", Some("not.a.token"), None)
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn admin_creates_user_who_can_login() {
    let app = spawn_app().await;
    let token = app.login("admin@aura", "Admin123!", "AURA").await;
    let siam = app.branch_id(&token, "Siam Branch").await;

    let response = app
        .request(
            Method::POST,
            "/auth/users",
            Some(&token),
            Some(json!({
                "username": "nurse@aura",
                "password": "Nurse123!",
                "full_name": "Nurse Aura",
                "role": "User",
                "branch_ids": [siam],
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body = body_json(response).await;
    assert_eq!(body["role"], "User");
    assert_eq!(body["branches"].as_array().unwrap().len(), 1);

    app.login("nurse@aura", "Nurse123!", "AURA").await;
}

#[tokio::test]
async fn create_user_with_invalid_role_is_400() {
    let app = spawn_app().await;
    let token = app.login("admin@aura", "Admin123!", "AURA").await;

    let response = app
        .request(
            Method::POST,
            "/auth/users",
            Some(&token),
            Some(json!({
                "username": "root@aura",
                "password": "Root123!",
                "full_name": "Root",
                "role": "Root",
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn non_admins_cannot_manage_users() {
    let app = spawn_app().await;

    for (username, password) in [("user@aura", "User123!"), ("viewer@aura", "Viewer123!")] {
        let token = app.login(username, password, "AURA").await;
        let response = app
            .request(
                Method::POST,
                "/auth/users",
                Some(&token),
                Some(json!({
                    "username": "sneaky@aura",
                    "password": "Sneaky123!",
                    "full_name": "Sneaky",
                    "role": "Admin",
                })),
            )
            .await;
        assert_eq!(response.status(), 403, "{username} should be forbidden");
    }
}

#[tokio::test]
async fn promoted_viewer_can_create_patients_after_relogin() {
    let app = spawn_app().await;
    let admin = app.login("admin@aura", "Admin123!", "AURA").await;

    // Register a fresh viewer so we know its user id
    let response = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "trainee@aura",
                "password": "Trainee123!",
                "tenant_code": "AURA",
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let user_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/auth/users/{user_id}/role"),
            Some(&admin),
            Some(json!({ "role": "User" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["role"], "User");

    // Role is read from the token, so the promotion applies at next login
    let token = app.login("trainee@aura", "Trainee123!", "AURA").await;
    let response = app
        .request(
            Method::POST,
            "/patients",
            Some(&token),
            Some(json!({
                "first_name": "Promoted",
                "last_name": "Creator",
                "phone_number": "089-000-0001",
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn assign_role_to_unknown_user_is_404() {
    let app = spawn_app().await;
    let admin = app.login("admin@aura", "Admin123!", "AURA").await;

    let response = app
        .request(
            Method::PUT,
            "/auth/users/no-such-user/role",
            Some(&admin),
            Some(json!({ "role": "Admin" })),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn add_branches_rejects_users_of_other_tenants() {
    let app = spawn_app().await;

    // A fresh SLM account, so we know its user id
    let response = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "clerk@silom",
                "password": "Clerk123!",
                "tenant_code": "SLM",
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let slm_user = body_json(response).await["id"].as_str().unwrap().to_string();

    let aura_admin = app.login("admin@aura", "Admin123!", "AURA").await;
    let siam = app.branch_id(&aura_admin, "Siam Branch").await;

    let response = app
        .request(
            Method::POST,
            &format!("/auth/users/{slm_user}/branches"),
            Some(&aura_admin),
            Some(json!({ "branch_ids": [siam] })),
        )
        .await;
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn add_branches_rejects_branches_of_other_tenants() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "intern@aura",
                "password": "Intern123!",
                "tenant_code": "AURA",
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let aura_user = body_json(response).await["id"].as_str().unwrap().to_string();

    let slm_admin = app.login("admin@silom", "Admin123!", "SLM").await;
    let sathorn = app.branch_id(&slm_admin, "Sathorn Branch").await;

    let aura_admin = app.login("admin@aura", "Admin123!", "AURA").await;
    let response = app
        .request(
            Method::POST,
            &format!("/auth/users/{aura_user}/branches"),
            Some(&aura_admin),
            Some(json!({ "branch_ids": [sathorn] })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert_eq!(body_json(response).await["code"], "INVALID_REFERENCE");
}

#[tokio::test]
async fn assign_tenant_moves_the_user() {
    let app = spawn_app().await;

    let response = app
        .request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "mover@aura",
                "password": "Mover123!",
                "tenant_code": "AURA",
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let user_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let admin = app.login("admin@aura", "Admin123!", "AURA").await;
    let tenants = app.request(Method::GET, "/auth/tenants", None, None).await;
    let tenants = body_json(tenants).await;
    let slm_id = tenants
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["code"] == "SLM")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/auth/users/{user_id}/tenant"),
            Some(&admin),
            Some(json!({ "tenant_id": slm_id })),
        )
        .await;
    assert_eq!(response.status(), 200);

    // Login now resolves in the new tenant only
    app.login("mover@aura", "Mover123!", "SLM").await;
    let response = app
        .request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({
                "username": "mover@aura",
                "password": "Mover123!",
                "tenant_code": "AURA",
            })),
        )
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn branches_endpoint_is_tenant_scoped() {
    let app = spawn_app().await;

    let aura = app.login("admin@aura", "Admin123!", "AURA").await;
    let response = app.request(Method::GET, "/branches", Some(&aura), None).await;
    let body = body_json(response).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Siam Branch", "Thonglor Branch"]);

    let slm = app.login("admin@silom", "Admin123!", "SLM").await;
    let response = app.request(Method::GET, "/branches", Some(&slm), None).await;
    let body = body_json(response).await;
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["name"] != "Siam Branch"));
}

#[tokio::test]
async fn health_and_root_are_public() {
    let app = spawn_app().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), 200);
    assert_eq!(body_json(response).await["status"], "ok");

    let response = app.request(Method::GET, "/", None, None).await;
    assert_eq!(response.status(), 200);
}
