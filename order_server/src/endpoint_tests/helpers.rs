use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Duration, Utc};
use log::debug;
use order_engine::db_types::{Order, OrderId, OrderStatusType, Product, ProductId, UserId};
use serde_json::Value;
use shop_common::Money;

use crate::{
    auth::TokenIssuer,
    config::{AuthConfig, ServerOptions},
    middleware::{AdminApiKey, API_KEY_HEADER},
};

// DO NOT re-use these secrets anywhere.
pub const TEST_JWT_SECRET: &str = "endpoint-test-secret-not-for-production-use";
pub const TEST_ADMIN_KEY: &str = "endpoint-test-admin-key";

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&AuthConfig::new(TEST_JWT_SECRET))
}

pub fn issue_token(user_id: UserId) -> String {
    token_issuer().issue_token(user_id, None).expect("Failed to sign token")
}

pub fn expired_token(user_id: UserId) -> String {
    token_issuer().issue_token(user_id, Some(Duration::hours(-1))).expect("Failed to sign token")
}

/// How the request authenticates itself.
pub enum Credentials<'a> {
    None,
    Bearer(&'a str),
    ApiKey(&'a str),
}

pub async fn get_request<F>(creds: Credentials<'_>, path: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    send_request(TestRequest::get().uri(path), creds, configure).await
}

pub async fn post_request<F>(creds: Credentials<'_>, path: &str, body: Value, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    send_request(TestRequest::post().uri(path).set_json(body), creds, configure).await
}

pub async fn send_request<F>(req: TestRequest, creds: Credentials<'_>, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) {
    let req = match creds {
        Credentials::None => req,
        Credentials::Bearer(token) => req.insert_header(("Authorization", format!("Bearer {token}"))),
        Credentials::ApiKey(key) => req.insert_header((API_KEY_HEADER, key)),
    };
    let app = App::new()
        .app_data(web::Data::new(token_issuer()))
        .app_data(web::Data::new(AdminApiKey::new(TEST_ADMIN_KEY)))
        .app_data(web::Data::new(ServerOptions::default()))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        // Middleware rejections arrive as errors rather than responses
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = res.into_body().try_into_bytes().unwrap_or_default();
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}

pub fn order(id: OrderId, user_id: UserId, status: OrderStatusType, total: i64) -> Order {
    let ts = Utc::now();
    Order { id, user_id, status, total_amount: Money::from(total), created_at: ts, updated_at: ts }
}

pub fn product(id: ProductId, name: &str, price: i64, inventory: i64) -> Product {
    let ts = Utc::now();
    Product {
        id,
        name: name.to_string(),
        description: format!("A fine {name}"),
        price: Money::from(price),
        inventory,
        created_at: ts,
        updated_at: ts,
    }
}
