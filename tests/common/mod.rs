//! Shared harness: each test gets its own seeded SQLite database and drives
//! the full router in-process via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use clinic_api::config::{
    AppConfig, CacheConfig, DatabaseConfig, Environment, SecurityConfig, ServerConfig,
};
use clinic_api::database::repos::sqlite::{
    SqliteBranchRepo, SqlitePatientRepo, SqliteTenantRepo, SqliteUserRepo,
};
use clinic_api::database::seed::seed_demo_data;
use clinic_api::database::{
    BranchRepository, PatientRepository, TenantRepository, UserRepository,
};
use clinic_api::router::create_router;
use clinic_api::state::AppState;

pub struct TestApp {
    pub router: Router,
    db_file: String,
}

fn test_app_config(database_url: String) -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        server: ServerConfig { port: 0 },
        database: DatabaseConfig {
            url: database_url,
            max_connections: 5,
        },
        security: SecurityConfig {
            jwt_secret: "integration-test-secret".to_string(),
            jwt_issuer: "clinic-api".to_string(),
            jwt_audience: "clinic-api".to_string(),
            token_ttl_hours: 8,
            // Cheap key derivation keeps the seeded logins fast
            pbkdf2_iterations: 1_000,
        },
        cache: CacheConfig {
            patient_list_ttl_secs: 300,
        },
    }
}

pub async fn spawn_app() -> TestApp {
    let db_file = format!("test_{}.db", uuid::Uuid::new_v4());
    let database_url = format!("sqlite://{db_file}?mode=rwc");

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to open test database");

    sqlx::migrate!("./migrations/sqlite")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let config = test_app_config(database_url);

    let tenants: Arc<dyn TenantRepository> = Arc::new(SqliteTenantRepo::new(pool.clone()));
    let branches: Arc<dyn BranchRepository> = Arc::new(SqliteBranchRepo::new(pool.clone()));
    let users: Arc<dyn UserRepository> = Arc::new(SqliteUserRepo::new(pool.clone()));
    let patients: Arc<dyn PatientRepository> = Arc::new(SqlitePatientRepo::new(pool));

    seed_demo_data(
        &tenants,
        &branches,
        &users,
        &patients,
        config.security.pbkdf2_iterations,
    )
    .await
    .expect("failed to seed test data");

    let state = Arc::new(AppState::new(config, tenants, branches, users, patients));
    TestApp {
        router: create_router(state),
        db_file,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed")
    }

    /// Login with seeded or freshly created credentials, returning the token.
    pub async fn login(&self, username: &str, password: &str, tenant_code: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({
                    "username": username,
                    "password": password,
                    "tenant_code": tenant_code,
                })),
            )
            .await;
        assert_eq!(response.status(), 200, "login failed for {username}");

        let body = body_json(response).await;
        body["token"].as_str().expect("token missing").to_string()
    }

    /// Branch ids of the caller's tenant, keyed by branch name.
    pub async fn branch_id(&self, token: &str, name: &str) -> String {
        let response = self.request(Method::GET, "/branches", Some(token), None).await;
        assert_eq!(response.status(), 200);

        let body = body_json(response).await;
        body.as_array()
            .expect("branch list")
            .iter()
            .find(|b| b["name"] == name)
            .unwrap_or_else(|| panic!("no branch named {name}"))["id"]
            .as_str()
            .expect("branch id")
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.db_file, suffix));
        }
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not valid JSON")
}
