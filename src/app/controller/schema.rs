use axum::Json;
use utoipa::PartialSchema;
use validator::Validate;

use crate::app::extract::JsonOrForm;
use crate::app::model::User;
use crate::app::response::{ApiError, ApiResult, Message};

/// The `User` schema, and validation of bodies against it.
pub struct SchemaController;

#[keel_macros::controller(state = crate::state::AppState)]
impl SchemaController {
    #[keel_macros::get("/user")]
    #[keel_macros::responds(status = 200, description = "JSON schema of `User`")]
    pub async fn describe() -> ApiResult<Json<serde_json::Value>> {
        let schema = serde_json::to_value(User::schema()).map_err(|err| ApiError::Internal(err.into()))?;

        Ok(Json(schema))
    }

    #[keel_macros::post("/user")]
    #[keel_macros::accepts(User)]
    #[keel_macros::responds(status = 200, body = User, description = "The body is a valid user")]
    #[keel_macros::responds(status = 415, body = Message, description = "Neither JSON nor a form")]
    #[keel_macros::responds(status = 422, body = Message, description = "The body is not a valid user")]
    pub async fn validate(JsonOrForm(user): JsonOrForm<User>) -> ApiResult<Json<User>> {
        user.validate()?;

        Ok(Json(user))
    }
}
