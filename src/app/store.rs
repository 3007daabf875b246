use crate::error::{Result, TestEnvError};
use crate::utils::{deserialize, serialize};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::{Path, PathBuf};

const DATA_DIR: &str = "data";

/// Key/value store backing the runtime. Each module keeps its records in its
/// own named tree; values are bincode encoded.
///
/// The database is opened in temporary mode: it lives under
/// `<node_home>/data` and is removed once the last handle is dropped.
#[derive(Clone)]
pub struct Store {
    db: Db,
    path: PathBuf,
}

impl Store {
    pub fn open_temporary(node_home: &Path) -> Result<Store> {
        let path = node_home.join(DATA_DIR);
        let db = sled::Config::new()
            .temporary(true)
            .path(&path)
            .open()
            .map_err(|e| TestEnvError::Database(format!("Failed to open store: {e}")))?;
        Ok(Store { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tree(&self, name: &str) -> Result<sled::Tree> {
        self.db
            .open_tree(name)
            .map_err(|e| TestEnvError::Database(format!("Failed to open tree {name}: {e}")))
    }

    pub fn get<T: DeserializeOwned>(&self, tree: &str, key: &[u8]) -> Result<Option<T>> {
        let data = self
            .tree(tree)?
            .get(key)
            .map_err(|e| TestEnvError::Database(format!("Failed to read from {tree}: {e}")))?;
        data.map(|bytes| deserialize(bytes.as_ref())).transpose()
    }

    pub fn set<T: Serialize>(&self, tree: &str, key: &[u8], value: &T) -> Result<()> {
        let bytes = serialize(value)?;
        self.tree(tree)?
            .insert(key, bytes)
            .map_err(|e| TestEnvError::Database(format!("Failed to write to {tree}: {e}")))?;
        Ok(())
    }

    pub fn remove(&self, tree: &str, key: &[u8]) -> Result<()> {
        self.tree(tree)?
            .remove(key)
            .map_err(|e| TestEnvError::Database(format!("Failed to delete from {tree}: {e}")))?;
        Ok(())
    }

    pub fn contains(&self, tree: &str, key: &[u8]) -> Result<bool> {
        self.tree(tree)?
            .contains_key(key)
            .map_err(|e| TestEnvError::Database(format!("Failed to read from {tree}: {e}")))
    }

    /// All entries whose key starts with `prefix`, in key order
    pub fn scan_prefix<T: DeserializeOwned>(
        &self,
        tree: &str,
        prefix: &[u8],
    ) -> Result<Vec<(Vec<u8>, T)>> {
        let mut entries = Vec::new();
        for item in self.tree(tree)?.scan_prefix(prefix) {
            let (k, v) = item.map_err(|e| {
                TestEnvError::Database(format!("Failed to iterate {tree}: {e}"))
            })?;
            entries.push((k.to_vec(), deserialize(v.as_ref())?));
        }
        Ok(entries)
    }

    /// All values of a tree, in key order
    pub fn values<T: DeserializeOwned>(&self, tree: &str) -> Result<Vec<T>> {
        Ok(self
            .scan_prefix(tree, &[])?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }
}
