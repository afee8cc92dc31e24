/// A group of handlers mounted together under one prefix.
///
/// Implemented by `#[keel_macros::controller]`, which also emits a
/// `<Name>Api` struct describing the same routes for OpenAPI.
pub trait Controller {
    type State: Clone + Send + Sync + 'static;

    fn router() -> axum::Router<Self::State>;
}
