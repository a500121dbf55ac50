use thiserror::Error;

use crate::db_types::{NewProduct, Product, ProductId, ProductValidationError};

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("{0}")]
    InvalidProduct(#[from] ProductValidationError),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}

/// Read and write access to the product catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches the products for the given ids in a single query. Ids that do not exist are simply absent from the
    /// result, so callers must check for missing products themselves.
    async fn fetch_products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, CatalogError>;

    /// Fetches the whole catalog, ordered by id.
    async fn fetch_all_products(&self) -> Result<Vec<Product>, CatalogError>;

    /// Validates and stores a new product, returning the stored record.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;
}
