pub mod bid_repository;
pub mod collection;
pub mod job_repository;

use collection::Collection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage engine error: {0}")]
    Engine(#[from] sled::Error),
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("corrupt document: {0}")]
    Corrupt(String),
}

/// Process-wide handle to the document store. Cloning is cheap and shares the
/// underlying connection.
#[derive(Clone)]
pub struct Database {
    pub db: sled::Db,
}

impl Database {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Database { db })
    }

    #[allow(dead_code)]
    pub fn in_memory() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Database { db })
    }

    pub fn collection(&self, name: &str) -> Result<Collection, StoreError> {
        let tree = self.db.open_tree(name)?;
        Ok(Collection::new(tree, self.db.clone()))
    }

    /// Cheap liveness probe used by the health endpoint.
    pub fn is_healthy(&self) -> bool {
        self.db.size_on_disk().is_ok()
    }

    /// Flush pending writes; called once the server has stopped accepting requests.
    pub async fn close(&self) -> Result<(), StoreError> {
        self.db.flush_async().await?;
        Ok(())
    }
}
