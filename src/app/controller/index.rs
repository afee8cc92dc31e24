use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct Greeting {
    pub hello: String,
}

pub struct IndexController;

#[keel_macros::controller(state = crate::state::AppState)]
impl IndexController {
    #[keel_macros::get("/")]
    #[keel_macros::responds(Greeting)]
    pub async fn index() -> Json<Greeting> {
        Json(Greeting { hello: "world".into() })
    }
}
