mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get};
use serde_json::json;

#[tokio::test]
async fn openapi_document_is_served() {
    let response = get(build_test_app(), "/doc-swagger/json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;

    assert_eq!(doc["info"]["title"], "Keel Swagger");
    assert_eq!(doc["info"]["version"], "2.6.0");
    assert_eq!(doc["externalDocs"]["url"], "http://localhost");
    assert_eq!(doc["servers"][0]["url"], "http://127.0.0.1:3000");
}

#[tokio::test]
async fn openapi_document_declares_the_user_model() {
    let doc = body_json(get(build_test_app(), "/doc-swagger/json").await).await;
    let user = &doc["components"]["schemas"]["User"];

    assert_eq!(user["required"], json!(["id", "email"]));
    assert_eq!(user["properties"]["email"]["format"], "email");
}

#[tokio::test]
async fn openapi_document_declares_security_schemes() {
    let doc = body_json(get(build_test_app(), "/doc-swagger/json").await).await;
    let schemes = &doc["components"]["securitySchemes"];

    assert_eq!(schemes["apiKey"], json!({ "type": "apiKey", "name": "apiKey", "in": "header" }));
    assert_eq!(schemes["bearerAuth"]["scheme"], "bearer");
    assert_eq!(doc["paths"]["/login/me"]["get"]["security"], json!([{ "bearerAuth": [] }]));
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let response = get(build_test_app(), "/doc-swagger/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(common::body_bytes(response).await).unwrap();
    assert!(html.contains("swagger"));
}
