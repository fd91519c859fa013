//! Basket lines and the basket-to-order flow.

mod common;

use axum::http::{Method, StatusCode};
use common::{ids, response_json, ProductSeed, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal string")
        .parse()
        .expect("decimal")
}

#[tokio::test]
async fn basket_requires_authentication() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/api/basket").await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn adding_the_same_product_twice_increments_the_line() {
    let app = TestApp::new().await;
    let (_, token) = app.customer("ann").await;
    let phones = app.category("Phones", None).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;

    for count in [1, 2] {
        let response = app
            .request(
                Method::POST,
                "/api/basket",
                Some(json!({"id": phone.id, "count": count})),
                Some(&token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let basket = response_json(app.request(Method::GET, "/api/basket", None, Some(&token)).await).await;
    let lines = basket.as_array().expect("array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["id"], phone.id);
    assert_eq!(lines[0]["count"], 3);
}

#[tokio::test]
async fn removing_at_least_the_held_quantity_drops_the_line() {
    let app = TestApp::new().await;
    let (_, token) = app.customer("ann").await;
    let phones = app.category("Phones", None).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;
    let case = app.product(ProductSeed::new("Case", phones.id, dec!(15))).await;

    app.request(Method::POST, "/api/basket", Some(json!({"id": phone.id, "count": 3})), Some(&token))
        .await;
    app.request(Method::POST, "/api/basket", Some(json!({"id": case.id, "count": 1})), Some(&token))
        .await;

    let partial = response_json(
        app.request(Method::DELETE, "/api/basket", Some(json!({"id": phone.id, "count": 2})), Some(&token))
            .await,
    )
    .await;
    let phone_line = partial
        .as_array()
        .expect("array")
        .iter()
        .find(|line| line["id"] == phone.id)
        .cloned()
        .expect("phone still in basket");
    assert_eq!(phone_line["count"], 1);

    let emptied = response_json(
        app.request(Method::DELETE, "/api/basket", Some(json!({"id": phone.id, "count": 1})), Some(&token))
            .await,
    )
    .await;
    assert_eq!(ids(&emptied), vec![case.id as i64]);

    let missing = app
        .request(Method::DELETE, "/api/basket", Some(json!({"id": phone.id, "count": 1})), Some(&token))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn basket_rejects_zero_counts_and_unknown_products() {
    let app = TestApp::new().await;
    let (_, token) = app.customer("ann").await;
    let phones = app.category("Phones", None).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;

    let zero = app
        .request(Method::POST, "/api/basket", Some(json!({"id": phone.id, "count": 0})), Some(&token))
        .await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .request(Method::POST, "/api/basket", Some(json!({"id": 9999, "count": 1})), Some(&token))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn baskets_are_per_user() {
    let app = TestApp::new().await;
    let (_, ann) = app.customer("ann").await;
    let (_, bo) = app.customer("bo").await;
    let phones = app.category("Phones", None).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;

    app.request(Method::POST, "/api/basket", Some(json!({"id": phone.id, "count": 1})), Some(&ann))
        .await;

    let other = response_json(app.request(Method::GET, "/api/basket", None, Some(&bo)).await).await;
    assert_eq!(other, json!([]));
}

#[tokio::test]
async fn ordering_moves_the_basket_into_an_order() {
    let app = TestApp::new().await;
    let (_, token) = app.customer("ann").await;
    let phones = app.category("Phones", None).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;
    let case = app.product(ProductSeed::new("Case", phones.id, dec!(15.50))).await;

    app.request(Method::POST, "/api/basket", Some(json!({"id": phone.id, "count": 2})), Some(&token))
        .await;
    app.request(Method::POST, "/api/basket", Some(json!({"id": case.id, "count": 1})), Some(&token))
        .await;

    let created = app.request(Method::POST, "/api/orders", None, Some(&token)).await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let order_id = response_json(created).await["orderId"]
        .as_i64()
        .expect("order id");

    let basket = response_json(app.request(Method::GET, "/api/basket", None, Some(&token)).await).await;
    assert_eq!(basket, json!([]));

    let order = response_json(
        app.request(Method::GET, &format!("/api/order/{}", order_id), None, Some(&token))
            .await,
    )
    .await;
    assert_eq!(order["status"], "created");
    assert_eq!(order["deliveryType"], "ordinary");
    assert_eq!(order["paymentType"], "online");
    assert_eq!(decimal(&order["totalCost"]), dec!(615.50));
    assert_eq!(order["products"].as_array().map(Vec::len), Some(2));

    let confirmed = app
        .request(
            Method::POST,
            &format!("/api/order/{}", order_id),
            Some(json!({
                "deliveryType": "express",
                "paymentType": "someone",
                "city": "Moscow",
                "address": "Red Square 1"
            })),
            Some(&token),
        )
        .await;
    assert_eq!(confirmed.status(), StatusCode::OK);
    let confirmed = response_json(confirmed).await;
    assert_eq!(confirmed["status"], "accepted");
    assert_eq!(confirmed["deliveryType"], "express");
    assert_eq!(confirmed["city"], "Moscow");

    let history = response_json(app.request(Method::GET, "/api/orders", None, Some(&token)).await).await;
    assert_eq!(ids(&history), vec![order_id]);
}

#[tokio::test]
async fn ordering_an_empty_basket_is_a_bad_request() {
    let app = TestApp::new().await;
    let (_, token) = app.customer("ann").await;

    let response = app.request(Method::POST, "/api/orders", None, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn orders_of_other_users_are_not_found() {
    let app = TestApp::new().await;
    let (_, ann) = app.customer("ann").await;
    let (_, bo) = app.customer("bo").await;
    let phones = app.category("Phones", None).await;
    let phone = app.product(ProductSeed::new("Phone", phones.id, dec!(300))).await;

    app.request(Method::POST, "/api/basket", Some(json!({"id": phone.id, "count": 1})), Some(&ann))
        .await;
    let order_id = response_json(app.request(Method::POST, "/api/orders", None, Some(&ann)).await).await
        ["orderId"]
        .as_i64()
        .expect("order id");

    let peek = app
        .request(Method::GET, &format!("/api/order/{}", order_id), None, Some(&bo))
        .await;
    assert_eq!(peek.status(), StatusCode::NOT_FOUND);
}
