//! Backend selection.

use anyhow::Result;

use circulate_core::store::Store;

use crate::config::{Backend, Config};
use crate::db;
use crate::json_store::JsonStore;
use crate::sqlite_store::SqliteStore;

/// Open the configured backend behind the uniform [`Store`] trait.
pub async fn open_store(config: &Config) -> Result<Box<dyn Store>> {
    match config.store.backend {
        Backend::File => Ok(Box::new(JsonStore::open(&config.store.path)?)),
        Backend::Sqlite => {
            let pool = db::connect(config).await?;
            Ok(Box::new(SqliteStore::new(pool)))
        }
    }
}
