use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::dependencies::DependencyKey;
use crate::standups::models::Standup;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode standups: {0}")]
    Decode(#[from] serde_json::Error),
}

type Load = Arc<dyn Fn() -> Result<Vec<u8>, DataError> + Send + Sync>;
type Save = Arc<dyn Fn(&[u8]) -> Result<(), DataError> + Send + Sync>;

/// Persistence of the standups list as JSON bytes.
#[derive(Clone)]
pub struct DataManager {
    load: Load,
    save: Save,
}

impl DataManager {
    pub fn new(
        load: impl Fn() -> Result<Vec<u8>, DataError> + Send + Sync + 'static,
        save: impl Fn(&[u8]) -> Result<(), DataError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            load: Arc::new(load),
            save: Arc::new(save),
        }
    }

    /// In-memory storage shared by every clone.
    pub fn mock(initial: Vec<u8>) -> Self {
        let data = Arc::new(Mutex::new(initial));
        let saved = Arc::clone(&data);
        Self::new(
            move || Ok(data.lock().clone()),
            move |bytes| {
                *saved.lock() = bytes.to_vec();
                Ok(())
            },
        )
    }

    /// In-memory storage seeded with `standups`.
    pub fn mock_standups(standups: &[Standup]) -> Self {
        // Serializing plain data structs cannot fail.
        Self::mock(serde_json::to_vec(standups).unwrap_or_default())
    }

    pub fn file(path: PathBuf) -> Self {
        let load_path = path.clone();
        Self::new(
            move || {
                std::fs::read(&load_path).map_err(|source| DataError::Io {
                    path: load_path.clone(),
                    source,
                })
            },
            move |bytes| {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|source| DataError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                std::fs::write(&path, bytes).map_err(|source| DataError::Io {
                    path: path.clone(),
                    source,
                })
            },
        )
    }

    /// `~/.local/share/statecraft/standups.json` or the platform equivalent.
    pub fn default_path() -> PathBuf {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.join("statecraft").join("standups.json")
    }

    pub fn load(&self) -> Result<Vec<u8>, DataError> {
        (self.load)()
    }

    pub fn save(&self, bytes: &[u8]) -> Result<(), DataError> {
        (self.save)(bytes)
    }

    pub fn load_standups(&self) -> Result<Vec<Standup>, DataError> {
        let bytes = self.load()?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save_standups(&self, standups: &[Standup]) -> Result<(), DataError> {
        let bytes = serde_json::to_vec_pretty(standups)?;
        self.save(&bytes)
    }
}

impl fmt::Debug for DataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataManager")
    }
}

pub struct DataManagerKey;

impl DependencyKey for DataManagerKey {
    type Value = DataManager;

    fn test_value() -> Self::Value {
        DataManager::mock(b"[]".to_vec())
    }

    fn live_value() -> Option<Self::Value> {
        Some(DataManager::file(DataManager::default_path()))
    }
}
