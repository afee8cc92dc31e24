use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;

const METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
];

/// Any origin unless `CORS_ORIGINS` lists some.
pub fn layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let origin = if config.cors_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|err| anyhow::anyhow!("invalid CORS origin `{origin}`: {err}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(METHODS)
        .allow_headers(Any))
}
