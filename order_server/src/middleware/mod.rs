mod api_key;

pub use api_key::{AdminApiKey, ApiKeyMiddlewareFactory, ApiKeyMiddlewareService, API_KEY_HEADER};
