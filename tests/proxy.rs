mod common;

use std::collections::HashMap;

use axum::Router;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use common::{body_json, get as get_path};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Stands in for both outbound APIs: `/api/rest/users` and `/api/`.
async fn spawn_upstream() -> String {
    let upstream = Router::new()
        .route("/api/rest/users", get(|| async { Json(json!([{ "id": 1, "name": "Ada" }])) }))
        .route(
            "/api",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({ "results": query.get("results") }))
            }),
        )
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });

    format!("http://{addr}")
}

#[tokio::test]
async fn rest_users_are_fetched_through_the_v1_client() {
    let upstream = spawn_upstream().await;
    let app = common::build_app_with(&[("V1_BASE_URL", format!("{upstream}/api/rest").as_str())]);

    let response = get_path(app, "/demo/rest/users").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([{ "id": 1, "name": "Ada" }]));
}

#[tokio::test]
async fn random_users_clamp_the_result_count() {
    let upstream = spawn_upstream().await;
    let app = common::build_app_with(&[("V2_BASE_URL", format!("{upstream}/api").as_str())]);

    let response = get_path(app, "/demo/random-users?results=500").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["results"], "50");
}

#[tokio::test]
async fn upstream_failures_are_502() {
    let upstream = spawn_upstream().await;
    let app = common::build_app_with(&[("V1_BASE_URL", format!("{upstream}/broken").as_str())]);

    let response = get_path(app, "/demo/rest/users").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
