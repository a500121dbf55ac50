//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use log::*;
use order_engine::{
    db_types::NewProduct,
    traits::{CartStore, CatalogManagement, CheckoutDatabase, OrderManagement, PaymentGateway},
    CartApi,
    CatalogApi,
    CheckoutApi,
    OrderApi,
    ReconciliationApi,
    WebhookResponse,
};
use serde_json::json;

use crate::{
    auth::JwtClaims,
    config::ServerOptions,
    data_objects::{
        AddCartItemParams,
        CreateOrderResponse,
        JsonResponse,
        OrderDetailResponse,
        OrderSummary,
        UpdateCartItemParams,
        UpdateOrderStatusParams,
    },
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro.
//
// `route!(name => Method "/path" impl <B: TraitA + TraitB, C: TraitC>)` registers the generic handler `name`. Append
// `requires api_key` to put the route behind the admin API key.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl <$($g:ident : $b0:ident $(+ $bound:ident)*),+>) => {
        $crate::route!(@build $name => $method $path [$($g : $b0 $(+ $bound)*),+] []);
    };

    ($name:ident => $method:ident $path:literal impl <$($g:ident : $b0:ident $(+ $bound:ident)*),+> requires api_key) => {
        $crate::route!(@build $name => $method $path [$($g : $b0 $(+ $bound)*),+]
            [.wrap($crate::middleware::ApiKeyMiddlewareFactory::new())]);
    };

    (@build $name:ident => $method:ident $path:literal [$($g:ident : $b0:ident $(+ $bound:ident)*),+] [$($wrap:tt)*]) => {
        paste::paste! { pub struct [<$name:camel Route>]<$($g),+>(core::marker::PhantomData<fn() -> ($($g,)+)>);}
        paste::paste! { impl<$($g),+> [<$name:camel Route>]<$($g),+> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData)
            }
        }}
        paste::paste! { impl<$($g),+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$($g),+>
        where
            $($g: $b0 $(+ $bound)* + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<$($g),+>)
                    $($wrap)*;
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl <B: CatalogManagement + CheckoutDatabase, C: CartStore, P: PaymentGateway>);
/// Route handler for checkout
///
/// Turns everything in the caller's cart into a new order and starts the payment for it. The response carries the
/// provider's payment page in `payment_url`.
///
/// The order is created even if the payment could not be started. In that case `payment_url` is empty, `message`
/// explains what happened, and the order stays `pending`.
pub async fn create_order<B, C, P>(
    claims: JwtClaims,
    api: web::Data<CheckoutApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement + CheckoutDatabase,
    C: CartStore,
    P: PaymentGateway,
{
    debug!("💻️ POST create_order for user {}", claims.user_id);
    let outcome = api.create_order(claims.user_id).await.map_err(|e| {
        debug!("💻️ Checkout failed for user {}. {e}", claims.user_id);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Created().json(CreateOrderResponse::from(outcome)))
}

route!(my_orders => Get "/orders" impl <B: OrderManagement>);
/// Route handler for the orders endpoint
///
/// Authenticated users fetch their own orders here, newest first.
pub async fn my_orders<B: OrderManagement>(
    claims: JwtClaims,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for user {}", claims.user_id);
    let orders = api.orders_for_user(claims.user_id).await?;
    let orders = orders.into_iter().map(OrderSummary::from).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl <B: OrderManagement>);
/// Route handler for a single order, with its items.
///
/// An order that belongs to somebody else is indistinguishable from one that does not exist.
pub async fn order_by_id<B: OrderManagement>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_id(&path.into_inner(), "order")?;
    debug!("💻️ GET order #{order_id} for user {}", claims.user_id);
    let order = api
        .order_for_user(order_id, claims.user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} not found")))?;
    Ok(HttpResponse::Ok().json(OrderDetailResponse::from(order)))
}

route!(update_order_status => Patch "/admin/orders/{order_id}/status" impl <B: OrderManagement> requires api_key);
/// Route handler for the administrative status override.
///
/// Unlike payment notifications, this writes the new status whatever the current one is. It exists to resolve orders
/// that the store and the payment provider disagree about, and the reason is logged with the change.
pub async fn update_order_status<B: OrderManagement>(
    path: web::Path<String>,
    body: web::Json<UpdateOrderStatusParams>,
    api: web::Data<OrderApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = parse_id(&path.into_inner(), "order")?;
    let params = body.into_inner();
    if params.reason.trim().is_empty() {
        return Err(ServerError::ValidationError("A reason is required when overriding an order status".into()));
    }
    debug!("💻️ PATCH status of order #{order_id} to {}", params.status);
    let order = api.force_status(order_id, params.status, &params.reason).await?;
    Ok(HttpResponse::Ok().json(OrderSummary::from(order)))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(payment_webhook => Post "/webhook/payment" impl <B: OrderManagement>);
/// Route handler for the payment provider's notifications.
///
/// Only the status code matters to the provider, so the response never has a body. Anything other than `200` makes the
/// provider deliver the notification again later.
pub async fn payment_webhook<B: OrderManagement>(
    req: HttpRequest,
    body: web::Bytes,
    options: web::Data<ServerOptions>,
    api: web::Data<ReconciliationApi<B>>,
) -> HttpResponse {
    let source = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded);
    trace!("💻️ Received payment notification from {source:?}");
    let result = api.handle_notification(source, &body).await;
    HttpResponse::build(webhook_status(result)).finish()
}

fn webhook_status(response: WebhookResponse) -> StatusCode {
    match response {
        WebhookResponse::Ok => StatusCode::OK,
        WebhookResponse::Forbidden => StatusCode::FORBIDDEN,
        WebhookResponse::BadRequest => StatusCode::BAD_REQUEST,
        WebhookResponse::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Where the payment provider sends the customer after a successful payment.
#[get("/payment/success")]
pub async fn payment_success() -> impl Responder {
    trace!("💻️ Customer returned from a successful payment");
    HttpResponse::Ok().json(json!({ "message": "Оплата прошла успешно. Заказ в обработке." }))
}

/// Where the payment provider sends the customer after a failed or abandoned payment.
#[get("/payment/fail")]
pub async fn payment_fail() -> impl Responder {
    trace!("💻️ Customer returned from a failed payment");
    HttpResponse::Ok().json(json!({ "message": "Оплата не удалась. Попробуйте снова или свяжитесь с поддержкой." }))
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(list_products => Get "/products" impl <B: CatalogManagement>);
pub async fn list_products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.list_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(create_product => Post "/products" impl <B: CatalogManagement> requires api_key);
pub async fn create_product<B: CatalogManagement>(
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ POST new product '{}'", product.name);
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl <B: CatalogManagement, C: CartStore>);
/// The caller's cart, priced at the current catalog prices. Products that have left the catalog are not shown.
pub async fn my_cart<B, C>(claims: JwtClaims, api: web::Data<CartApi<B, C>>) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
    C: CartStore,
{
    trace!("💻️ GET cart for user {}", claims.user_id);
    let cart = api.cart_view(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(add_cart_item => Post "/cart/items" impl <B: CatalogManagement, C: CartStore>);
/// Adds to the quantity of a product in the cart.
pub async fn add_cart_item<B, C>(
    claims: JwtClaims,
    body: web::Json<AddCartItemParams>,
    api: web::Data<CartApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
    C: CartStore,
{
    let AddCartItemParams { product_id, quantity } = body.into_inner();
    debug!("💻️ POST {quantity} x product {product_id} to the cart of user {}", claims.user_id);
    api.add_item(claims.user_id, product_id, quantity).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Item added to cart")))
}

route!(update_cart_item => Put "/cart/items/{product_id}" impl <B: CatalogManagement, C: CartStore>);
/// Sets the quantity of a product in the cart. A quantity of zero or less removes it.
pub async fn update_cart_item<B, C>(
    claims: JwtClaims,
    path: web::Path<String>,
    body: web::Json<UpdateCartItemParams>,
    api: web::Data<CartApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
    C: CartStore,
{
    let product_id = parse_id(&path.into_inner(), "product")?;
    let quantity = body.into_inner().quantity;
    debug!("💻️ PUT quantity of product {product_id} to {quantity} for user {}", claims.user_id);
    api.set_item(claims.user_id, product_id, quantity).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Cart updated")))
}

route!(remove_cart_item => Delete "/cart/items/{product_id}" impl <B: CatalogManagement, C: CartStore>);
pub async fn remove_cart_item<B, C>(
    claims: JwtClaims,
    path: web::Path<String>,
    api: web::Data<CartApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
    C: CartStore,
{
    let product_id = parse_id(&path.into_inner(), "product")?;
    debug!("💻️ DELETE product {product_id} from the cart of user {}", claims.user_id);
    api.remove_item(claims.user_id, product_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Item removed from cart")))
}

route!(clear_cart => Delete "/cart" impl <B: CatalogManagement, C: CartStore>);
pub async fn clear_cart<B, C>(claims: JwtClaims, api: web::Data<CartApi<B, C>>) -> Result<HttpResponse, ServerError>
where
    B: CatalogManagement,
    C: CartStore,
{
    debug!("💻️ DELETE cart for user {}", claims.user_id);
    api.clear(claims.user_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Cart cleared")))
}

/// Ids in request paths are positive integers. Anything else is a bad request.
fn parse_id(raw: &str, what: &str) -> Result<i64, ServerError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ServerError::InvalidRequestPath(format!("'{raw}' is not a valid {what} id")))
}
