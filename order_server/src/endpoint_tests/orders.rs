use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use order_engine::{
    db_types::{CartContents, OrderItem, OrderLine, OrderStatusType, OrderWithItems},
    events::EventProducers,
    traits::{PaymentGatewayError, PaymentRedirect, PlacedOrder},
    CheckoutApi,
    OrderApi,
};
use serde_json::{json, Value};
use shop_common::Money;

use super::{
    helpers::{expired_token, get_request, issue_token, order, post_request, product, send_request, Credentials},
    mocks::{MockCarts, MockPayments, MockShopDb},
};
use crate::routes::{CreateOrderRoute, MyOrdersRoute, OrderByIdRoute, UpdateOrderStatusRoute};

const USER: i64 = 11;

fn configure_checkout(db: MockShopDb, carts: MockCarts, payments: MockPayments) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CheckoutApi::new(db, carts, payments, EventProducers::default());
        cfg.app_data(web::Data::new(api)).service(CreateOrderRoute::<MockShopDb, MockCarts, MockPayments>::new());
    }
}

fn configure_orders(db: MockShopDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderApi::new(db, EventProducers::default());
        cfg.app_data(web::Data::new(api))
            .service(MyOrdersRoute::<MockShopDb>::new())
            .service(OrderByIdRoute::<MockShopDb>::new())
            .service(UpdateOrderStatusRoute::<MockShopDb>::new());
    }
}

/// A cart with two mugs at 10.00 and one tea at 5.00, and a database that will accept the order.
fn checkout_mocks() -> (MockShopDb, MockCarts) {
    let mut db = MockShopDb::new();
    db.expect_fetch_products_by_ids()
        .returning(|_| Ok(vec![product(1, "Mug", 1000, 10), product(2, "Tea", 500, 10)]));
    db.expect_place_order().times(1).returning(|user_id, lines| {
        assert_eq!(lines.len(), 2);
        let items = vec![
            OrderItem { id: 1, order_id: 7, product_id: 1, quantity: 2, price_at_purchase: Money::from(1000) },
            OrderItem { id: 2, order_id: 7, product_id: 2, quantity: 1, price_at_purchase: Money::from(500) },
        ];
        Ok(PlacedOrder { order: order(7, user_id, OrderStatusType::Pending, 2500), items })
    });
    let mut carts = MockCarts::new();
    carts.expect_get_cart().returning(|_| Ok(CartContents::from([(1, 2), (2, 1)])));
    carts.expect_clear_cart().times(1).returning(|_| Ok(()));
    (db, carts)
}

#[actix_web::test]
async fn create_order_without_a_token() {
    let _ = env_logger::try_init().ok();
    let configure = configure_checkout(MockShopDb::new(), MockCarts::new(), MockPayments::new());
    let (status, body) = post_request(Credentials::None, "/orders", json!({}), configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Authentication Error. authorization header required"}"#);
}

#[actix_web::test]
async fn create_order_with_an_expired_token() {
    let _ = env_logger::try_init().ok();
    let token = expired_token(USER);
    let configure = configure_checkout(MockShopDb::new(), MockCarts::new(), MockPayments::new());
    let (status, _) = post_request(Credentials::Bearer(&token), "/orders", json!({}), configure).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let (db, carts) = checkout_mocks();
    let mut payments = MockPayments::new();
    payments.expect_create_payment().times(1).returning(|order| {
        assert_eq!(order.total_amount, Money::from(2500));
        Ok(PaymentRedirect {
            payment_id: "2d7f-000f-5000-9000".into(),
            confirmation_url: format!("https://pay.example.com/checkout?order={}", order.id),
            status: "pending".into(),
        })
    });
    let token = issue_token(USER);
    let (status, body) =
        post_request(Credentials::Bearer(&token), "/orders", json!({}), configure_checkout(db, carts, payments)).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(
        body,
        json!({
            "order_id": 7,
            "status": "pending",
            "total_amount": 2500,
            "payment_url": "https://pay.example.com/checkout?order=7",
            "message": "order created"
        })
    );
}

#[actix_web::test]
async fn create_order_when_payment_cannot_start() {
    let _ = env_logger::try_init().ok();
    let (db, carts) = checkout_mocks();
    let mut payments = MockPayments::new();
    payments.expect_create_payment().times(1).returning(|_| Err(PaymentGatewayError::Timeout));
    let token = issue_token(USER);
    let (status, body) =
        post_request(Credentials::Bearer(&token), "/orders", json!({}), configure_checkout(db, carts, payments)).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["order_id"], 7);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["payment_url"], "");
    assert!(body["message"].as_str().unwrap().contains("payment could not be initiated"));
}

#[actix_web::test]
async fn create_order_with_an_empty_cart() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_place_order().never();
    let mut carts = MockCarts::new();
    carts.expect_get_cart().returning(|_| Ok(CartContents::new()));
    let mut payments = MockPayments::new();
    payments.expect_create_payment().never();
    let token = issue_token(USER);
    let (status, body) =
        post_request(Credentials::Bearer(&token), "/orders", json!({}), configure_checkout(db, carts, payments)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"cart is empty"}"#);
}

#[actix_web::test]
async fn create_order_with_too_little_stock() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_products_by_ids().returning(|_| Ok(vec![product(1, "Mug", 1000, 3)]));
    db.expect_place_order().never();
    let mut carts = MockCarts::new();
    carts.expect_get_cart().returning(|_| Ok(CartContents::from([(1, 5)])));
    carts.expect_clear_cart().never();
    let token = issue_token(USER);
    let configure = configure_checkout(db, carts, MockPayments::new());
    let (status, body) = post_request(Credentials::Bearer(&token), "/orders", json!({}), configure).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"not enough inventory for product 1: need 5, available 3"}"#);
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_orders_for_user().withf(|user_id| *user_id == USER).returning(|user_id| {
        Ok(vec![order(9, user_id, OrderStatusType::Paid, 1500), order(4, user_id, OrderStatusType::Canceled, 700)])
    });
    let token = issue_token(USER);
    let (status, body) = get_request(Credentials::Bearer(&token), "/orders", configure_orders(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], 9);
    assert_eq!(orders[0]["status"], "paid");
    assert_eq!(orders[1]["status"], "canceled");
}

#[actix_web::test]
async fn fetch_order_by_id() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_order_for_user().withf(|order_id, user_id| *order_id == 7 && *user_id == USER).returning(
        |order_id, user_id| {
            let items = vec![OrderLine {
                product_id: 1,
                name: "Mug".into(),
                description: "A fine Mug".into(),
                quantity: 2,
                price_at_purchase: Money::from(1000),
            }];
            Ok(Some(OrderWithItems { order: order(order_id, user_id, OrderStatusType::Pending, 2000), items }))
        },
    );
    let token = issue_token(USER);
    let (status, body) = get_request(Credentials::Bearer(&token), "/orders/7", configure_orders(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], 7);
    assert_eq!(body["total_amount"], 2000);
    assert_eq!(
        body["items"],
        json!([{"product_id": 1, "name": "Mug", "description": "A fine Mug", "price": 1000, "quantity": 2, "subtotal": 2000}])
    );
}

#[actix_web::test]
async fn fetch_someone_elses_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_order_for_user().returning(|_, _| Ok(None));
    let token = issue_token(USER);
    let (status, body) = get_request(Credentials::Bearer(&token), "/orders/8", configure_orders(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order 8 not found"}"#);
}

#[actix_web::test]
async fn fetch_order_with_a_bad_id() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(USER);
    for path in ["/orders/abc", "/orders/0", "/orders/-3"] {
        let mut db = MockShopDb::new();
        db.expect_fetch_order_for_user().never();
        let (status, _) = get_request(Credentials::Bearer(&token), path, configure_orders(db)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
    }
}

#[actix_web::test]
async fn override_order_status() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_order_by_id().returning(|id| Ok(Some(order(id, USER, OrderStatusType::Canceled, 2500))));
    db.expect_force_order_status()
        .withf(|id, status| *id == 5 && *status == OrderStatusType::Paid)
        .times(1)
        .returning(|id, status| Ok(order(id, USER, status, 2500)));
    let req = TestRequest::patch()
        .uri("/admin/orders/5/status")
        .set_json(json!({"status": "paid", "reason": "Payment confirmed by the provider's support team"}));
    let (status, body) = send_request(req, Credentials::ApiKey("endpoint-test-admin-key"), configure_orders(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], 5);
    assert_eq!(body["status"], "paid");
}

#[actix_web::test]
async fn override_order_status_needs_the_api_key() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(USER);
    for creds in [Credentials::None, Credentials::Bearer(&token), Credentials::ApiKey("guess")] {
        let mut db = MockShopDb::new();
        db.expect_force_order_status().never();
        let req = TestRequest::patch().uri("/admin/orders/5/status").set_json(json!({"status": "paid", "reason": "x"}));
        let (status, body) = send_request(req, creds, configure_orders(db)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"error":"Authentication Error. invalid api key"}"#);
    }
}

#[actix_web::test]
async fn override_order_status_needs_a_reason() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_force_order_status().never();
    let req = TestRequest::patch().uri("/admin/orders/5/status").set_json(json!({"status": "canceled"}));
    let (status, _) = send_request(req, Credentials::ApiKey("endpoint-test-admin-key"), configure_orders(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
