use std::net::SocketAddr;

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use order_engine::{
    db_types::OrderStatusType,
    events::EventProducers,
    helpers::AddressAllowList,
    traits::{OrderError, StatusTransition},
    ReconciliationApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{order, send_request, Credentials},
    mocks::MockShopDb,
};
use crate::{config::ServerOptions, routes::PaymentWebhookRoute};

const PROVIDER_ADDRESS: &str = "185.71.76.10:443";

fn configure(db: MockShopDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let allow_list = AddressAllowList::parse_list("185.71.76.0/27, 77.75.156.11").unwrap();
        let api = ReconciliationApi::new(db, allow_list, EventProducers::default());
        cfg.app_data(web::Data::new(api)).service(PaymentWebhookRoute::<MockShopDb>::new());
    }
}

/// The server sits behind a proxy that appends the caller's address to `X-Forwarded-For`.
fn configure_behind_proxy(db: MockShopDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(ServerOptions { use_x_forwarded_for: true, ..Default::default() }));
        configure(db)(cfg);
    }
}

fn notification(event: &str, order_id: Value) -> Value {
    json!({
        "type": "notification",
        "event": event,
        "object": {
            "id": "2d7f1c3a-000f-5000-9000-1b2c3d4e5f60",
            "status": event.trim_start_matches("payment."),
            "metadata": { "order_id": order_id }
        }
    })
}

async fn deliver(from: &str, body: Value, db: MockShopDb) -> (StatusCode, String) {
    let peer = from.parse::<SocketAddr>().unwrap();
    let req = TestRequest::post().uri("/webhook/payment").peer_addr(peer).set_json(body);
    send_request(req, Credentials::None, configure(db)).await
}

#[actix_web::test]
async fn payment_succeeded() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status()
        .withf(|id, status| *id == 42 && *status == OrderStatusType::Paid)
        .times(1)
        .returning(|id, status| Ok(StatusTransition::Applied(order(id, 1, status, 2500))));
    let (status, body) = deliver(PROVIDER_ADDRESS, notification("payment.succeeded", json!("42")), db).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn duplicate_payment_succeeded_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status()
        .returning(|id, status| Ok(StatusTransition::AlreadyInStatus(order(id, 1, status, 2500))));
    let (status, _) = deliver(PROVIDER_ADDRESS, notification("payment.succeeded", json!("42")), db).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn notification_from_a_stranger() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status().never();
    let (status, body) = deliver("203.0.113.9:5555", notification("payment.succeeded", json!("42")), db).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn payment_succeeded_without_a_usable_order_id() {
    let _ = env_logger::try_init().ok();
    for order_id in [json!("0"), json!("abc"), json!(null), json!(-4)] {
        let mut db = MockShopDb::new();
        db.expect_transition_order_status().never();
        let (status, body) = deliver(PROVIDER_ADDRESS, notification("payment.succeeded", order_id.clone()), db).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "order_id: {order_id}");
        assert!(body.is_empty());
    }
}

#[actix_web::test]
async fn malformed_notification() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status().never();
    let (status, _) = deliver(PROVIDER_ADDRESS, json!({"event": "payment.succeeded"}), db).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn payment_succeeded_for_a_canceled_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status()
        .returning(|id, _| Ok(StatusTransition::Rejected(order(id, 1, OrderStatusType::Canceled, 2500))));
    let (status, _) = deliver(PROVIDER_ADDRESS, notification("payment.succeeded", json!("42")), db).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn payment_succeeded_when_the_database_is_down() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status().returning(|_, _| Err(OrderError::DatabaseError("database is locked".into())));
    let (status, body) = deliver(PROVIDER_ADDRESS, notification("payment.succeeded", json!("42")), db).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn late_cancellation_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status()
        .withf(|id, status| *id == 42 && *status == OrderStatusType::Canceled)
        .returning(|id, _| Ok(StatusTransition::Rejected(order(id, 1, OrderStatusType::Paid, 2500))));
    let (status, _) = deliver(PROVIDER_ADDRESS, notification("payment.canceled", json!("42")), db).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn forwarded_addresses_are_ignored_by_default() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status().never();
    let req = TestRequest::post()
        .uri("/webhook/payment")
        .peer_addr("203.0.113.9:5555".parse().unwrap())
        .insert_header(("X-Forwarded-For", "185.71.76.10"))
        .set_json(notification("payment.succeeded", json!("42")));
    let (status, _) = send_request(req, Credentials::None, configure(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn spoofed_forwarded_addresses_are_refused() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status().never();
    let req = TestRequest::post()
        .uri("/webhook/payment")
        .peer_addr("10.0.0.1:5555".parse().unwrap())
        .insert_header(("X-Forwarded-For", "185.71.76.10, 203.0.113.9"))
        .set_json(notification("payment.succeeded", json!("42")));
    let (status, _) = send_request(req, Credentials::None, configure_behind_proxy(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn proxied_provider_is_accepted() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status()
        .times(1)
        .returning(|id, status| Ok(StatusTransition::Applied(order(id, 1, status, 2500))));
    let req = TestRequest::post()
        .uri("/webhook/payment")
        .peer_addr("10.0.0.1:5555".parse().unwrap())
        .insert_header(("X-Forwarded-For", "198.51.100.4, 185.71.76.10"))
        .set_json(notification("payment.succeeded", json!("42")));
    let (status, _) = send_request(req, Credentials::None, configure_behind_proxy(db)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn other_message_types_are_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_transition_order_status().never();
    let (status, body) = deliver(PROVIDER_ADDRESS, json!({"type": "ping"}), db).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}
