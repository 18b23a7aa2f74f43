//! Persistence module split across logical submodules: the gateway contract,
//! the SQLite backend (one file per collection plus shared column codecs), and
//! the local JSON document backend.

mod columns;
mod connection;
mod gateway;
mod local;
mod members;
mod schedules;
mod songs;
mod sqlite;

pub use connection::{
    data_dir, ensure_schema, open_database, DATA_DIR_NAME, DB_FILE_NAME, LOCAL_FILE_NAME,
};
pub use gateway::PersistenceGateway;
pub use local::LocalStore;
pub use sqlite::SqliteGateway;

use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;

/// Build the gateway selected by configuration.
pub fn open_gateway(config: &StorageConfig) -> Result<Box<dyn PersistenceGateway>> {
    let path = match &config.path {
        Some(path) => path.clone(),
        None => data_dir()?.join(match config.backend {
            StorageBackend::Sqlite => DB_FILE_NAME,
            StorageBackend::Local => LOCAL_FILE_NAME,
        }),
    };
    info!(backend = ?config.backend, path = %path.display(), "opening storage");
    Ok(match config.backend {
        StorageBackend::Sqlite => Box::new(SqliteGateway::open(&path)?),
        StorageBackend::Local => Box::new(LocalStore::open(&path)?),
    })
}
