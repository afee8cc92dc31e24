use axum::Router;
use axum::middleware;
use keel_core::controller::Controller;

use crate::app::controller::{
    DemoController, IndexController, LoginController, SchemaController, SessionController, TestController,
    UploadController,
};
use crate::app::middleware::auth::{AuthUser, JwtAuthenticator, auth_middleware};
use crate::state::AppState;

/// The six route modules, each under its own prefix.
pub fn routes() -> Router<AppState> {
    let login = LoginController::router().merge(
        SessionController::router().route_layer(middleware::from_fn(auth_middleware::<JwtAuthenticator, AuthUser>)),
    );

    Router::new()
        .merge(IndexController::router())
        .nest("/demo", DemoController::router())
        .nest("/test", TestController::router())
        .nest("/login", login)
        .nest("/upload", UploadController::router())
        .nest("/schema", SchemaController::router())
}
