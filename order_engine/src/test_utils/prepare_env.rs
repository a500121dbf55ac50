use log::*;
use shop_common::Money;
use sqlx::{migrate::MigrateDatabase, Sqlite};

use crate::{
    db_types::{NewProduct, Product},
    traits::CatalogManagement,
    SqliteDatabase,
};

/// Creates a fresh database at `url` with the schema applied.
pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    let db = SqliteDatabase::new_with_url(url, 25).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    db
}

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("test_shop_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn create_database(url: &str) {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        if let Err(e) = Sqlite::drop_database(url).await {
            warn!("Error dropping database {url}: {e:?}");
        }
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

pub async fn tear_down(mut db: SqliteDatabase) {
    let url = db.url().to_string();
    db.close().await.expect("Error closing database");
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
}

/// Adds a product with the given price (in minor units) and stock.
pub async fn seed_product(db: &SqliteDatabase, name: &str, price: i64, inventory: i64) -> Product {
    db.insert_product(NewProduct::new(name, Money::from(price), inventory)).await.expect("Error seeding product")
}
