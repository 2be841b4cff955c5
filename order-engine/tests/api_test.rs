//! HTTP surface through `tower::ServiceExt::oneshot`

mod common;

use axum::body::Body;
use common::Fixture;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use order_engine::api;
use order_engine::core::{Config, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(fx: &Fixture) -> axum::Router {
    let state = ServerState::new(Config::default(), fx.db.clone()).with_orders(fx.service.clone());
    api::router(state)
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, merchant_id: i64, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-merchant-id", merchant_id.to_string())
        .header("x-user-id", "77")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_edit_and_fetch_over_http() {
    let fx = Fixture::new().await;
    let bun = fx.tracked_item("Bao bun", 3.5, 6).await;
    let merchant_id = fx.ctx.merchant_id;

    let (status, body) = send(
        app(&fx),
        json_request(
            "POST",
            "/api/orders",
            merchant_id,
            json!({
                "order_type": "TAKEAWAY",
                "items": [{ "menu_item_id": bun.to_string(), "quantity": 2 }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["code"], "SUCCESS");
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["items"][0]["menu_item_id"], bun.to_string());
    assert_eq!(body["data"]["totals"]["total"], 7.0);

    let (status, body) = send(
        app(&fx),
        json_request(
            "PUT",
            &format!("/api/orders/{order_id}/items"),
            merchant_id,
            json!({
                "order_type": "TAKEAWAY",
                "items": [{ "menu_item_id": bun, "quantity": 3 }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["totals"]["subtotal"], 10.5);
    assert_eq!(fx.menu_stock(bun).await, 3);

    let req = Request::builder()
        .uri(format!("/api/orders/{order_id}"))
        .header("x-merchant-id", merchant_id.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&fx), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["edited_by"], "77");
}

#[tokio::test]
async fn test_errors_render_code_and_message() {
    let fx = Fixture::new().await;
    let bun = fx.tracked_item("Bao bun", 3.5, 1).await;
    let merchant_id = fx.ctx.merchant_id;

    let (status, body) = send(
        app(&fx),
        json_request(
            "POST",
            "/api/orders",
            merchant_id,
            json!({
                "order_type": "TAKEAWAY",
                "items": [{ "menu_item_id": bun, "quantity": 2 }]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["message"], "Insufficient stock for Bao bun");

    let (status, body) = send(
        app(&fx),
        json_request(
            "POST",
            "/api/orders/12345/status",
            merchant_id,
            json!({ "status": "ACCEPTED" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ORDER_NOT_FOUND");

    let req = Request::builder()
        .uri("/api/orders/1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app(&fx), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_health() {
    let fx = Fixture::new().await;
    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app(&fx).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}
