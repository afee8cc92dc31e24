use axum::extract::State;
use axum::{Extension, Json};
use keel_core::auth::Authenticator;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::extract::JsonOrForm;
use crate::app::middleware::auth::{AuthUser, LoginRequest};
use crate::app::response::{ApiResult, Message};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

pub struct LoginController;

#[keel_macros::controller(state = AppState)]
impl LoginController {
    #[keel_macros::post("/")]
    #[keel_macros::accepts(LoginRequest)]
    #[keel_macros::responds(status = 200, body = TokenResponse, description = "Credentials accepted")]
    #[keel_macros::responds(status = 401, body = Message, description = "Wrong email or password")]
    #[keel_macros::responds(status = 422, body = Message, description = "Malformed credentials")]
    #[keel_macros::responds(status = 503, body = Message, description = "User store unavailable")]
    pub async fn login(
        State(state): State<AppState>,
        JsonOrForm(credentials): JsonOrForm<LoginRequest>,
    ) -> ApiResult<Json<TokenResponse>> {
        let user = state.authenticator.attempt(credentials).await?;
        let token = state.authenticator.generate_token(&user)?;
        tracing::info!(user = %user.id, "login succeeded");

        Ok(Json(TokenResponse {
            token,
            token_type: "Bearer".into(),
            expires_in: state.authenticator.expires_in_secs(),
        }))
    }
}

/// Routes behind `auth_middleware`; the router adds the guard.
pub struct SessionController;

#[keel_macros::controller(state = AppState)]
impl SessionController {
    #[keel_macros::get("/me")]
    #[keel_macros::secured("bearerAuth")]
    #[keel_macros::responds(status = 200, body = AuthUser, description = "The token's user")]
    #[keel_macros::responds(status = 401, description = "Missing or invalid token")]
    pub async fn me(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
        Json(user)
    }
}
