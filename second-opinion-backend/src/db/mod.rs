pub mod sqlite;
pub mod tables;

pub use sqlite::Database;

use std::sync::Arc;

use crate::error::StoreError;

/// Run a store operation on the blocking pool
pub async fn with_store<F, T>(db: &Arc<Database>, op: F) -> Result<T, StoreError>
where
    F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || op(&db))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}
