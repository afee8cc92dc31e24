#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use keel::app::middleware::auth::JwtAuthenticator;
use keel::config::AppConfig;
use keel::integrations::database::Databases;
use keel::integrations::http_client::HttpClients;
use keel::integrations::qrcode::QrGenerator;
use keel::integrations::ws::WsHub;
use keel::state::AppState;
use keel_core::config::ConfigBuilder;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

/// Configuration as the binary would read it. Uploads go to `UPLOAD_DIR`'s
/// default unless `extra` overrides it; tests that upload use [`TestApp`].
pub fn test_config(extra: &[(&str, &str)]) -> AppConfig {
    let mut env = HashMap::from([
        ("SECRET_KEY".to_owned(), SECRET.to_owned()),
        ("HOST".to_owned(), "127.0.0.1".to_owned()),
    ]);
    for (key, value) in extra {
        env.insert((*key).to_owned(), (*value).to_owned());
    }

    AppConfig::build_from(&env).unwrap()
}

/// State without any database pool, so no server is needed.
pub fn test_state(config: AppConfig) -> AppState {
    let databases = Databases::default();

    AppState {
        authenticator: JwtAuthenticator::new(&config.secret_key, config.jwt_expiry_mins, databases.clone()).unwrap(),
        clients: HttpClients::new(&config.clients).unwrap(),
        qrcode: QrGenerator::default(),
        hub: WsHub::new(),
        databases,
        config: Arc::new(config),
    }
}

/// The production router, layers included.
pub fn build_test_app() -> Router {
    build_app_with(&[])
}

pub fn build_app_with(extra: &[(&str, &str)]) -> Router {
    keel::bootstrap::app(test_state(test_config(extra))).unwrap()
}

/// An app whose uploads land in a temporary directory, removed when the
/// fixture is dropped.
pub struct TestApp {
    pub router: Router,
    uploads: TempDir,
}

impl TestApp {
    pub fn new(extra: &[(&str, &str)]) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let upload_dir = uploads.path().to_string_lossy().into_owned();

        let mut env = vec![("UPLOAD_DIR", upload_dir.as_str())];
        env.extend_from_slice(extra);

        TestApp {
            router: build_app_with(&env),
            uploads,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        self.uploads.path()
    }
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post(app: Router, uri: &str, content_type: &str, body: impl Into<Body>) -> Response<Body> {
    let request = Request::post(uri)
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> Response<Body> {
    post(app, uri, "application/json", body.to_string()).await
}
