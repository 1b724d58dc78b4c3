//! Error mapping through the HTTP surface.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use schemagen_api::router::build_router;
use tower::ServiceExt;

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn missing_record_maps_to_404_with_code() {
    let app = build_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/markup/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = json_body(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn invalid_generate_body_is_rejected_before_the_pipeline() {
    let app = build_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/markup/generate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "url": "not a url",
                        "account_id": "acct-1",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_account_balance_is_bad_request() {
    let app = build_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/accounts/nobody/credits")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let app = build_router(common::test_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/markup/batch-generate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::json!({ "requests": [] }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
