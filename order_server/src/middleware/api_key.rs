//! Admin API key middleware.
//!
//! Wrap any route or service with [`ApiKeyMiddlewareFactory`] to require the `X-API-Key` header. The expected key is
//! read from the [`AdminApiKey`] in the application data. If no key has been configured, every request is refused.
use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::{ok, Ready};
use log::*;
use shop_common::Secret;

use crate::errors::{AuthError, ServerError};

pub const API_KEY_HEADER: &str = "X-API-Key";

#[derive(Clone, Debug, Default)]
pub struct AdminApiKey(pub Secret<String>);

impl AdminApiKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(Secret::new(key.into()))
    }

    pub fn matches(&self, candidate: &str) -> bool {
        let key = self.0.reveal();
        !key.is_empty() && key == candidate
    }
}

#[derive(Default)]
pub struct ApiKeyMiddlewareFactory;

impl ApiKeyMiddlewareFactory {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = ApiKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyMiddlewareService { service: Rc::new(service) })
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let supplied = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()).unwrap_or_default();
            let allowed = match req.app_data::<web::Data<AdminApiKey>>() {
                Some(key) => key.matches(supplied),
                None => {
                    error!("🔐️ No admin API key has been configured. Denying access to {}", req.path());
                    false
                },
            };
            if allowed {
                trace!("🔐️ Admin API key accepted for {}", req.path());
                service.call(req).await
            } else {
                warn!("🔐️ Invalid or missing admin API key for {}. Denying access.", req.path());
                Err(ServerError::AuthenticationError(AuthError::InvalidApiKey).into())
            }
        })
    }
}
