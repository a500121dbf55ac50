use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use order_engine::{
    events::EventProducers,
    CartApi,
    CatalogApi,
    CheckoutApi,
    OrderApi,
    ReconciliationApi,
    SqliteDatabase,
};

use crate::{
    auth::TokenIssuer,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::{order_events::create_order_event_handlers, yookassa::YooKassaGateway},
    middleware::AdminApiKey,
    routes::{
        health,
        payment_fail,
        payment_success,
        AddCartItemRoute,
        ClearCartRoute,
        CreateOrderRoute,
        CreateProductRoute,
        ListProductsRoute,
        MyCartRoute,
        MyOrdersRoute,
        OrderByIdRoute,
        PaymentWebhookRoute,
        RemoveCartItemRoute,
        UpdateCartItemRoute,
        UpdateOrderStatusRoute,
    },
};

const DB_MAX_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, DB_MAX_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    info!("🗃️ Database is ready at {}", db.url());
    let handlers = create_order_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers();
    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let gateway = YooKassaGateway::new(config.yookassa.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the payment client. {e}")))?;
    let db = db.with_cart_ttl(config.cart_ttl);
    let srv = HttpServer::new(move || {
        let checkout_api = CheckoutApi::new(db.clone(), db.clone(), gateway.clone(), producers.clone())
            .with_payment_timeout(options.payment_timeout);
        let reconciliation_api = ReconciliationApi::new(db.clone(), config.webhook_allow_list.clone(), producers.clone());
        let orders_api = OrderApi::new(db.clone(), producers.clone());
        let cart_api = CartApi::new(db.clone(), db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let jwt_signer = TokenIssuer::new(&config.auth);
        let admin_key = AdminApiKey(config.admin_api_key.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("shop::access_log"))
            .app_data(web::Data::new(checkout_api))
            .app_data(web::Data::new(reconciliation_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(jwt_signer))
            .app_data(web::Data::new(admin_key))
            .app_data(web::Data::new(options));
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase, SqliteDatabase, YooKassaGateway>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(ListProductsRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(MyCartRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(AddCartItemRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(payment_success)
            .service(payment_fail)
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
