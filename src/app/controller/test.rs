use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::app::response::{ApiError, ApiResult, Message};
use crate::integrations::database::DatabaseError;
use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct Connections {
    pub connections: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ConnectionStatus {
    pub connection: String,
    pub status: String,
}

/// Connectivity checks for the configured databases.
pub struct TestController;

#[keel_macros::controller(state = AppState)]
impl TestController {
    #[keel_macros::get("/")]
    #[keel_macros::responds(Connections)]
    pub async fn connections(State(state): State<AppState>) -> Json<Connections> {
        Json(Connections {
            connections: state.databases.names().map(str::to_owned).collect(),
        })
    }

    #[keel_macros::get("/db/{name}")]
    #[keel_macros::responds(status = 200, body = ConnectionStatus, description = "Connection answered a ping")]
    #[keel_macros::responds(status = 404, body = Message, description = "No connection with that name")]
    #[keel_macros::responds(status = 503, body = Message, description = "Connection unreachable")]
    pub async fn ping(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<ConnectionStatus>> {
        state.databases.ping(&name).await.map_err(|err| match err {
            DatabaseError::Unknown(_) => ApiError::NotFound(err.to_string()),
            DatabaseError::Unreachable { .. } => ApiError::Unavailable(err.to_string()),
        })?;

        Ok(Json(ConnectionStatus {
            connection: name,
            status: "ok".into(),
        }))
    }
}
