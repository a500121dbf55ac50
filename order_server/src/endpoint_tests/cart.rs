use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use order_engine::{db_types::CartContents, CartApi};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, issue_token, post_request, product, send_request, Credentials},
    mocks::{MockCarts, MockShopDb},
};
use crate::routes::{AddCartItemRoute, ClearCartRoute, MyCartRoute, RemoveCartItemRoute, UpdateCartItemRoute};

const USER: i64 = 21;

fn configure(db: MockShopDb, carts: MockCarts) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(CartApi::new(db, carts)))
            .service(MyCartRoute::<MockShopDb, MockCarts>::new())
            .service(AddCartItemRoute::<MockShopDb, MockCarts>::new())
            .service(UpdateCartItemRoute::<MockShopDb, MockCarts>::new())
            .service(RemoveCartItemRoute::<MockShopDb, MockCarts>::new())
            .service(ClearCartRoute::<MockShopDb, MockCarts>::new());
    }
}

#[actix_web::test]
async fn view_cart() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    // Product 3 has been removed from the catalog
    db.expect_fetch_products_by_ids().returning(|_| Ok(vec![product(1, "Mug", 1000, 10), product(2, "Tea", 500, 10)]));
    let mut carts = MockCarts::new();
    carts.expect_get_cart().withf(|user| *user == USER).returning(|_| Ok(CartContents::from([(2, 1), (1, 2), (3, 9)])));
    let token = issue_token(USER);
    let (status, body) = get_request(Credentials::Bearer(&token), "/cart", configure(db, carts)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["total"], 2500);
    assert_eq!(body["item_count"], 3);
    assert_eq!(body["items"][0]["product_id"], 1);
    assert_eq!(body["items"][0]["subtotal"], 2000);
    assert_eq!(body["items"][1]["product_id"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn view_cart_without_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, _) = get_request(Credentials::None, "/cart", configure(MockShopDb::new(), MockCarts::new())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn add_item() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_products_by_ids().returning(|_| Ok(vec![product(1, "Mug", 1000, 10)]));
    let mut carts = MockCarts::new();
    carts
        .expect_add_item()
        .withf(|user, product, qty| *user == USER && *product == 1 && *qty == 2)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let token = issue_token(USER);
    let body = json!({"product_id": 1, "quantity": 2});
    let (status, body) = post_request(Credentials::Bearer(&token), "/cart/items", body, configure(db, carts)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Item added to cart"}"#);
}

#[actix_web::test]
async fn add_unknown_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_products_by_ids().returning(|_| Ok(vec![]));
    let mut carts = MockCarts::new();
    carts.expect_add_item().never();
    let token = issue_token(USER);
    let body = json!({"product_id": 99, "quantity": 1});
    let (status, body) = post_request(Credentials::Bearer(&token), "/cart/items", body, configure(db, carts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"product 99 not found"}"#);
}

#[actix_web::test]
async fn add_nothing() {
    let _ = env_logger::try_init().ok();
    let mut carts = MockCarts::new();
    carts.expect_add_item().never();
    let token = issue_token(USER);
    let body = json!({"product_id": 1, "quantity": 0});
    let (status, _) =
        post_request(Credentials::Bearer(&token), "/cart/items", body, configure(MockShopDb::new(), carts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn set_quantity_to_zero_removes_the_item() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_products_by_ids().never();
    let mut carts = MockCarts::new();
    carts
        .expect_set_item()
        .withf(|user, product, qty| *user == USER && *product == 4 && *qty == 0)
        .times(1)
        .returning(|_, _, _| Ok(()));
    let token = issue_token(USER);
    let req = TestRequest::put().uri("/cart/items/4").set_json(json!({"quantity": 0}));
    let (status, _) = send_request(req, Credentials::Bearer(&token), configure(db, carts)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn remove_item_and_clear() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(USER);

    let mut carts = MockCarts::new();
    carts.expect_remove_item().withf(|user, product| *user == USER && *product == 4).times(1).returning(|_, _| Ok(()));
    let req = TestRequest::delete().uri("/cart/items/4");
    let (status, _) = send_request(req, Credentials::Bearer(&token), configure(MockShopDb::new(), carts)).await;
    assert_eq!(status, StatusCode::OK);

    let mut carts = MockCarts::new();
    carts.expect_clear_cart().withf(|user| *user == USER).times(1).returning(|_| Ok(()));
    let req = TestRequest::delete().uri("/cart");
    let (status, body) = send_request(req, Credentials::Bearer(&token), configure(MockShopDb::new(), carts)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"message":"Cart cleared"}"#);
}

#[actix_web::test]
async fn add_too_many() {
    let _ = env_logger::try_init().ok();
    let mut carts = MockCarts::new();
    carts.expect_add_item().never();
    let token = issue_token(USER);
    let body = json!({"product_id": 1, "quantity": i64::MAX / 10});
    let (status, _) =
        post_request(Credentials::Bearer(&token), "/cart/items", body, configure(MockShopDb::new(), carts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn view_cart_with_an_oversized_total() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_products_by_ids().returning(|_| Ok(vec![product(1, "Gold bar", i64::MAX / 100, 1000)]));
    let mut carts = MockCarts::new();
    carts.expect_get_cart().returning(|_| Ok(CartContents::from([(1, 1000)])));
    let token = issue_token(USER);
    let (status, body) = get_request(Credentials::Bearer(&token), "/cart", configure(db, carts)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"the cart total is too large"}"#);
}
