use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use order_engine::{db_types::Product, CatalogApi};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, issue_token, post_request, product, Credentials, TEST_ADMIN_KEY},
    mocks::MockShopDb,
};
use crate::routes::{CreateProductRoute, ListProductsRoute};

fn configure(db: MockShopDb) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(CatalogApi::new(db)))
            .service(ListProductsRoute::<MockShopDb>::new())
            .service(CreateProductRoute::<MockShopDb>::new());
    }
}

#[actix_web::test]
async fn list_products_is_public() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_fetch_all_products().returning(|| Ok(vec![product(1, "Mug", 1000, 10), product(2, "Tea", 500, 0)]));
    let (status, body) = get_request(Credentials::None, "/products", configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body[0]["name"], "Mug");
    assert_eq!(body[0]["price"], 1000);
    assert_eq!(body[1]["inventory"], 0);
}

#[actix_web::test]
async fn create_product() {
    let _ = env_logger::try_init().ok();
    let mut db = MockShopDb::new();
    db.expect_insert_product().times(1).returning(|p| {
        let ts = Utc::now();
        Ok(Product {
            id: 3,
            name: p.name,
            description: p.description,
            price: p.price,
            inventory: p.inventory,
            created_at: ts,
            updated_at: ts,
        })
    });
    let new_product = json!({"name": "Teapot", "description": "Cast iron", "price": 4500, "inventory": 4});
    let (status, body) = post_request(Credentials::ApiKey(TEST_ADMIN_KEY), "/products", new_product, configure(db)).await;
    assert_eq!(status, StatusCode::CREATED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["id"], 3);
    assert_eq!(body["name"], "Teapot");
    assert_eq!(body["price"], 4500);
}

#[actix_web::test]
async fn create_product_needs_the_api_key() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(1);
    let new_product = json!({"name": "Teapot", "price": 4500, "inventory": 4});
    for creds in [Credentials::None, Credentials::Bearer(&token), Credentials::ApiKey("not-the-key")] {
        let mut db = MockShopDb::new();
        db.expect_insert_product().never();
        let (status, _) = post_request(creds, "/products", new_product.clone(), configure(db)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn create_invalid_product() {
    let _ = env_logger::try_init().ok();
    for new_product in [
        json!({"name": "Teapot", "price": 0, "inventory": 4}),
        json!({"name": "Teapot", "price": 4500, "inventory": -1}),
        json!({"name": " ", "price": 4500, "inventory": 1}),
    ] {
        let mut db = MockShopDb::new();
        db.expect_insert_product().never();
        let (status, body) =
            post_request(Credentials::ApiKey(TEST_ADMIN_KEY), "/products", new_product, configure(db)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid product"), "{body}");
    }
}
