use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use order_engine::{
    traits::{CartError, CatalogError, OrderError},
    CartApiError,
    CheckoutError,
};
use thiserror::Error;

const GENERIC_SERVER_ERROR: &str = "An internal error occurred. Please try again later.";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not serialize access token. {0}")]
    CouldNotSerializeAccessToken(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
}

impl ServerError {
    /// Server-side failures carry details that are useful in the logs, but not to the caller.
    fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = if self.is_internal() {
            error!("💻️ {self}");
            GENERIC_SERVER_ERROR.to_string()
        } else {
            self.to_string()
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": message }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("authorization header required")]
    MissingToken,
    #[error("invalid or expired token. {0}")]
    ValidationError(String),
    #[error("access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("invalid api key")]
    InvalidApiKey,
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::EmptyCart |
            CheckoutError::ProductNotFound(_) |
            CheckoutError::InsufficientInventory { .. } |
            CheckoutError::TotalTooLarge => Self::ValidationError(e.to_string()),
            CheckoutError::CartUnavailable(_) | CheckoutError::PersistenceFailure(_) => {
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<CatalogError> for ServerError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::InvalidProduct(_) => Self::ValidationError(e.to_string()),
            CatalogError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<CartError> for ServerError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::InvalidQuantity(_) | CartError::QuantityTooLarge(_) => Self::ValidationError(e.to_string()),
            CartError::StorageError(e) => Self::BackendError(format!("Cart storage error: {e}")),
        }
    }
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::Cart(e) => e.into(),
            CartApiError::Catalog(e) => e.into(),
            CartApiError::ProductNotFound(_) | CartApiError::TotalTooLarge => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<OrderError> for ServerError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id} does not exist")),
            OrderError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
