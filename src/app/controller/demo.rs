use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::app::response::{ApiResult, Message};
use crate::state::AppState;

const MAX_RANDOM_USERS: u32 = 50;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QrQuery {
    /// Text to encode.
    pub text: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RandomUsersQuery {
    /// Number of users, 1 to 50.
    pub results: Option<u32>,
}

/// Small endpoints exercising the QR generator and the outbound clients.
pub struct DemoController;

#[keel_macros::controller(state = AppState)]
impl DemoController {
    #[keel_macros::get("/qrcode")]
    #[keel_macros::responds(status = 200, body = String, content_type = "image/svg+xml", description = "QR code as SVG")]
    #[keel_macros::responds(status = 400, body = Message, description = "Empty or oversized text")]
    pub async fn qrcode(State(state): State<AppState>, Query(query): Query<QrQuery>) -> ApiResult<Response> {
        let svg = state.qrcode.svg(&query.text)?;

        Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
    }

    #[keel_macros::get("/clients")]
    #[keel_macros::responds(status = 200, description = "Outbound client aliases and their base urls")]
    pub async fn clients(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
        Json(
            state
                .clients
                .aliases()
                .map(|(alias, url)| (alias.to_owned(), url.to_string()))
                .collect(),
        )
    }

    #[keel_macros::get("/random-users")]
    #[keel_macros::responds(status = 200, description = "Response of the `v2` client, passed through")]
    #[keel_macros::responds(status = 502, body = Message, description = "Upstream failure")]
    pub async fn random_users(
        State(state): State<AppState>,
        Query(query): Query<RandomUsersQuery>,
    ) -> ApiResult<Json<serde_json::Value>> {
        let results = query.results.unwrap_or(1).clamp(1, MAX_RANDOM_USERS);
        let body = state
            .clients
            .get_json("v2", "/", &[("results", results.to_string())])
            .await?;

        Ok(Json(body))
    }

    #[keel_macros::get("/rest/users")]
    #[keel_macros::responds(status = 200, description = "Response of the `v1` client, passed through")]
    #[keel_macros::responds(status = 502, body = Message, description = "Upstream failure")]
    pub async fn rest_users(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
        let body = state.clients.get_json("v1", "/users", &[]).await?;

        Ok(Json(body))
    }
}
