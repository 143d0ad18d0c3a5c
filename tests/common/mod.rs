#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use pinbox_api::auth::{password::Hasher, SessionIssuer};
use pinbox_api::config::{AppConfig, SigningKey};
use pinbox_api::services::{CredentialStore, DisabledTitleResolver, TitleResolver};
use pinbox_api::{app, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";

/// One in-process server per test, bound to an ephemeral loopback port
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(Arc::new(DisabledTitleResolver), issuer()?).await
    }

    pub async fn spawn_with_titles(titles: Arc<dyn TitleResolver>) -> Result<Self> {
        Self::spawn_with(titles, issuer()?).await
    }

    pub async fn spawn_with(titles: Arc<dyn TitleResolver>, sessions: SessionIssuer) -> Result<Self> {
        let mut config = AppConfig::development(SigningKey::new(TEST_SECRET));
        config.api.enable_request_logging = false;
        config.titles.fetch_enabled = false;

        // Minimum argon2 costs keep registration fast
        let credentials = CredentialStore::new(Hasher::new(8, 1, 1)?)?;
        let state = AppState::new(credentials, sessions, titles);
        let router = app(state, &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });

        Ok(Self {
            addr,
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .post("/api/register")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .post("/api/login")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?)
    }

    /// Register a fresh account and return its bearer token
    pub async fn register_and_login(&self, username: &str) -> Result<String> {
        let res = self.register(username, "password123").await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let res = self.login(username, "password123").await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response missing token")
    }
}

pub fn issuer() -> Result<SessionIssuer> {
    Ok(SessionIssuer::new(&SigningKey::new(TEST_SECRET))?)
}

/// Assert the standard error body shape and return it
pub async fn expect_error(res: reqwest::Response, status: StatusCode, code: &str) -> Result<Value> {
    assert_eq!(res.status(), status, "unexpected status");
    let body: Value = res.json().await?;
    assert_eq!(body["code"], code, "unexpected error body: {}", body);
    assert!(body["error"].is_string());
    Ok(body)
}
