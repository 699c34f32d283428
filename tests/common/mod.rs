#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use restaurant_api::auth::JwtKeys;
use restaurant_api::client::ClientError;
use restaurant_api::config::AppConfig;
use restaurant_api::database::{MemoryRestaurantStore, RestaurantStore};
use restaurant_api::form::RestaurantApi;
use restaurant_api::models::{Restaurant, RestaurantPatch, RestaurantPayload};
use restaurant_api::server::{app, AppState};
use restaurant_api::types::Role;

pub const TEST_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The real server binary, started once per test process.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_restaurant-api"));
        cmd.env("SERVER_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("SECURITY_JWT_SECRET", TEST_SECRET)
            // Empty means "no database": always use the in-memory store
            .env("DATABASE_URL", "")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);

        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }

    /// Token accepted by the spawned server.
    pub fn token(&self, user: Uuid, role: Role) -> String {
        JwtKeys::new(TEST_SECRET, 1)
            .and_then(|keys| keys.issue(user, role))
            .expect("test secret is valid")
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server =
        SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// The router driven in-process over an empty in-memory store.
#[derive(Clone)]
pub struct Harness {
    router: Router,
    keys: JwtKeys,
}

impl Harness {
    pub fn new() -> Self {
        let config = AppConfig::development();
        let keys = JwtKeys::from_config(&config.security).expect("development secret is set");
        let store: std::sync::Arc<dyn RestaurantStore> =
            std::sync::Arc::new(MemoryRestaurantStore::new());
        let router = app(AppState::new(store, keys.clone()), &config);
        Self { router, keys }
    }

    pub fn token(&self, user: Uuid, role: Role) -> String {
        self.keys.issue(user, role).expect("token signs")
    }

    /// A fresh owner identity and its bearer token.
    pub fn owner(&self) -> (Uuid, String) {
        let id = Uuid::new_v4();
        (id, self.token(id, Role::Owner))
    }

    pub fn customer(&self) -> (Uuid, String) {
        let id = Uuid::new_v4();
        (id, self.token(id, Role::Customer))
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Create the sample listing for `token` and return its id.
    pub async fn create_sample(&self, token: &str) -> String {
        let (status, body) = self.post("/restaurant/create", token, sample_listing()).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body["data"]["id"]
            .as_str()
            .expect("created record has an id")
            .to_string()
    }

    /// A form-controller backend that goes through the router as `token`.
    pub fn api(&self, token: String) -> RouterApi {
        RouterApi {
            harness: self.clone(),
            token,
        }
    }
}

pub fn sample_listing() -> Value {
    json!({
        "name": "GA Cafe",
        "category": "Western",
        "location": "Hauz Khas Village",
        "address": "12 Hauz Khas Village, New Delhi",
        "phone": "9999999999",
        "websiteUrl": "https://gacafe.com",
        "maxPax": 10,
        "timeOpen": 930,
        "timeClose": 2200,
        "daysClose": ["Tuesday", "Monday"],
        "description": "A cozy cafe offering coffee, tea and pastries."
    })
}

pub struct RouterApi {
    harness: Harness,
    token: String,
}

impl RouterApi {
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Result<Option<T>, ClientError> {
        let (status, json) = self
            .harness
            .send(method, uri, Some(&self.token), body)
            .await;
        if !status.is_success() {
            let message = json["error"].as_str().unwrap_or("request failed").to_string();
            return Err(ClientError::from_status(status.as_u16(), message));
        }
        serde_json::from_value(json["data"].clone()).map_err(|e| ClientError::Api {
            status: status.as_u16(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl RestaurantApi for RouterApi {
    async fn fetch_mine(&self) -> Result<Option<Restaurant>, ClientError> {
        self.call(Method::GET, "/restaurant/user", None).await
    }

    async fn create(&self, payload: &RestaurantPayload) -> Result<Restaurant, ClientError> {
        let body = serde_json::to_value(payload).expect("payload serializes");
        self.call(Method::POST, "/restaurant/create", Some(body))
            .await?
            .ok_or(ClientError::MissingData)
    }

    async fn edit(
        &self,
        rest_id: Uuid,
        payload: &RestaurantPayload,
    ) -> Result<Restaurant, ClientError> {
        let patch = RestaurantPatch::from(payload.clone());
        let body = serde_json::to_value(patch).expect("patch serializes");
        self.call(Method::POST, &format!("/restaurant/{}/edit", rest_id), Some(body))
            .await?
            .ok_or(ClientError::MissingData)
    }
}
