//! Read and create products in the catalog.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewProduct, Product},
    traits::{CatalogError, CatalogManagement},
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The full catalog, ordered by product id.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        self.db.fetch_all_products().await
    }

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, CatalogError> {
        product.validate()?;
        let product = self.db.insert_product(product).await?;
        info!("🛒️ Product #{} ({}) added to the catalog at {}", product.id, product.name, product.price);
        Ok(product)
    }
}
