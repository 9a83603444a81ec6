//! Key/value document storage backends

use super::PersistError;

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

/// Document store: one `<key>.json` file per document in a data directory
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Io { path, source }),
        }
    }

    /// Write via a temp file and rename so a crash never leaves half a document
    pub fn write(&self, key: &str, contents: &str) -> Result<(), PersistError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| PersistError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|source| PersistError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| PersistError::Io { path, source })
    }

    /// Fresh, empty store under the system temp directory
    #[cfg(test)]
    pub(crate) fn temp(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "avoid-the-block-{}-{}",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_dir_all(&dir);
        Self::new(dir)
    }
}

/// Document store backed by LocalStorage, keys namespaced by `prefix`
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct Store {
    prefix: String,
}

#[cfg(target_arch = "wasm32")]
impl Store {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }

    fn local_storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .ok_or_else(|| PersistError::Storage("no window".into()))?
            .local_storage()
            .map_err(|_| PersistError::Storage("access denied".into()))?
            .ok_or_else(|| PersistError::Storage("LocalStorage disabled".into()))
    }

    pub fn read(&self, key: &str) -> Result<Option<String>, PersistError> {
        Self::local_storage()?
            .get_item(&self.storage_key(key))
            .map_err(|_| PersistError::Storage(format!("read of {key} failed")))
    }

    pub fn write(&self, key: &str, contents: &str) -> Result<(), PersistError> {
        Self::local_storage()?
            .set_item(&self.storage_key(key), contents)
            .map_err(|_| PersistError::Storage(format!("write of {key} failed (quota?)")))
    }
}
