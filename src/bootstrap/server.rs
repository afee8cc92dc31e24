use std::fmt::Display;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router};
use keel_core::config::ConfigBuilder;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::{Config, SwaggerUi};

use crate::app::middleware::auth::JwtAuthenticator;
use crate::config::AppConfig;
use crate::docs::{self, DOCS_JSON_PATH, DOCS_PATH};
use crate::integrations::database::{self, Databases};
use crate::integrations::http_client::HttpClients;
use crate::integrations::qrcode::QrGenerator;
use crate::integrations::ws::{self, WsHub};
use crate::integrations::cors;
use crate::state::AppState;

/// Attaches the integration name to a failure and logs success, so a failed
/// start says which unit broke.
fn register<T, N: Display>(name: N, result: anyhow::Result<T>) -> anyhow::Result<T> {
    let value = result.with_context(|| format!("integration `{name}` failed to start"))?;
    tracing::info!(integration = %name, "registered");

    Ok(value)
}

/// Router-level integrations, built before any connection is opened.
pub struct Layers {
    pub docs: utoipa::openapi::OpenApi,
    pub body_limit: DefaultBodyLimit,
    pub cors: CorsLayer,
}

impl Layers {
    pub fn register(config: &AppConfig) -> anyhow::Result<Self> {
        let docs = register("documentation", Ok(docs::openapi(Some(&config.public_url()))))?;
        // Also bounds urlencoded bodies, which `JsonOrForm` decodes per handler.
        let body_limit = register("multipart", Ok(DefaultBodyLimit::max(config.body_limit)))?;
        let cors = register("cors", cors::layer(config))?;

        Ok(Layers { docs, body_limit, cors })
    }
}

/// Builds every integration in order and the router on top of them.
pub async fn assemble(config: AppConfig) -> anyhow::Result<(AppState, Router)> {
    let layers = Layers::register(&config)?;

    let mut connections = Vec::with_capacity(config.databases.len());
    for db in &config.databases {
        let connection = register(format!("database {}", db.name), database::connect(db).await)?;
        connections.push((db.name.clone(), connection));
    }
    let databases: Databases = connections.into_iter().collect();

    if config.migrate {
        register("migrations", databases.migrate().await)?;
    }

    let authenticator = register(
        "jwt",
        JwtAuthenticator::new(&config.secret_key, config.jwt_expiry_mins, databases.clone()),
    )?;
    let hub = register("websocket", Ok(WsHub::new()))?;
    let clients = register("http clients", HttpClients::new(&config.clients))?;
    let qrcode = register("qrcode", Ok(QrGenerator::default()))?;

    let state = AppState {
        config: Arc::new(config),
        databases,
        authenticator,
        clients,
        qrcode,
        hub,
    };

    let app = router(state.clone(), layers);
    tracing::info!(integration = "routes", "registered");

    Ok((state, app))
}

pub fn router(state: AppState, layers: Layers) -> Router {
    let swagger = SwaggerUi::new(DOCS_PATH)
        .url(DOCS_JSON_PATH, layers.docs)
        .config(Config::default().doc_expansion("full").deep_linking(false));

    Router::new()
        .merge(swagger)
        .merge(ws::router())
        .merge(crate::routes::routes())
        .layer(Extension(state.authenticator.clone()))
        .layer(layers.body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(layers.cors)
        .with_state(state)
}

/// The router for an already built state, with layers derived from its
/// configuration.
pub fn app(state: AppState) -> anyhow::Result<Router> {
    let layers = Layers::register(&state.config)?;

    Ok(router(state, layers))
}

pub async fn bind_listener(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("cannot listen on {host}:{port}"))
}

pub async fn init_server() -> anyhow::Result<()> {
    let config = AppConfig::build().context("cannot load configuration")?;
    let (state, app) = assemble(config).await?;

    let listener = bind_listener(&state.config.host, state.config.port).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    let hub = state.hub.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            hub.close();
        })
        .await
        .context("server error")?;

    tracing::info!("server stopped, closing database pools");
    state.databases.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
