mod common;

use axum::body::Body;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN};
use axum::http::{Method, Request};
use tower::ServiceExt;

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/schema/user")
        .header(ORIGIN, origin)
        .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn any_origin_is_allowed_by_default() {
    let response = common::build_test_app()
        .oneshot(preflight("https://anywhere.example"))
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn listed_origins_are_echoed_and_others_are_not() {
    let app = common::build_app_with(&[("CORS_ORIGINS", "https://app.example")]);

    let allowed = app.clone().oneshot(preflight("https://app.example")).await.unwrap();
    assert_eq!(allowed.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");

    let refused = app.oneshot(preflight("https://evil.example")).await.unwrap();
    assert!(refused.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
