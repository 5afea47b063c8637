//! Configuration persistence and merge

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hal_abstractions::BlobStore;

use crate::error::{ConfigError, StorageFault};

use super::{
    module_config_path, CommonConfig, ConfigDocument, ConfigObserver, COMMON_CONFIG_PATH,
    MAX_DOCUMENT_SIZE,
};

/// Owns the node's configuration documents
///
/// The in-memory module document is authoritative for the lifetime of the
/// process: it is loaded once by [`load`](Self::load), changed only through
/// [`merge`](Self::merge), and written back after every merge. A failed write
/// is logged and otherwise ignored until the next boot.
pub struct ConfigStore<S, O> {
    storage: S,
    observer: O,
    module_path: String,
    common: CommonConfig,
    document: ConfigDocument,
}

impl<S, O> ConfigStore<S, O>
where
    S: BlobStore,
    O: ConfigObserver,
{
    /// Create a store for the module named `module`
    ///
    /// `observer` is notified of every document change, starting with the
    /// one produced by [`load`](Self::load).
    pub fn new(storage: S, module: &str, observer: O) -> Self {
        Self {
            storage,
            observer,
            module_path: module_config_path(module),
            common: CommonConfig::default(),
            document: ConfigDocument::new(),
        }
    }

    /// Read both documents from storage and notify the observer
    ///
    /// Missing or unreadable documents are not errors: defaults apply.
    pub fn load(&mut self) {
        self.common = match self.read_document(COMMON_CONFIG_PATH) {
            Ok(document) => {
                info!("Loaded common config");
                CommonConfig::from_document(&document)
            }
            Err(e) => {
                warn!("Failed to load common config: {}", e);
                CommonConfig::default()
            }
        };

        let module_path = self.module_path.clone();
        self.document = match self.read_document(&module_path) {
            Ok(document) => {
                info!("Loaded device config ({} keys)", document.len());
                document
            }
            Err(ConfigError::Storage(StorageFault::NotFound)) => {
                info!("No device config found, using defaults");
                ConfigDocument::new()
            }
            Err(e) => {
                warn!("Ignoring stored device config: {}", e);
                ConfigDocument::new()
            }
        };

        self.observer.on_config_changed(&self.document);
    }

    /// Shallow-merge `patch` into the module document
    ///
    /// Each top-level key of `patch` is inserted, replacing any existing
    /// value; all other keys are kept. The result is persisted and the
    /// observer notified even if persisting fails, since the in-memory
    /// document stays authoritative.
    ///
    /// A patch whose result would serialize larger than
    /// [`MAX_DOCUMENT_SIZE`] is refused with
    /// [`ConfigError::DocumentTooLarge`]: nothing changes, nothing is
    /// written and the observer is not called. Otherwise returns the
    /// persist result for the caller to report.
    pub fn merge(&mut self, patch: ConfigDocument) -> Result<(), ConfigError> {
        let mut merged = self.document.clone();
        for (key, value) in patch {
            merged.insert(key, value);
        }
        let bytes = encode_document(&merged)?;
        self.document = merged;

        let persisted = self.write_document(&bytes);
        match persisted {
            Ok(()) => info!("Device config saved"),
            Err(e) => error!("Failed to save device config: {}", e),
        }

        self.observer.on_config_changed(&self.document);
        persisted
    }

    /// Write the module document to storage, replacing the previous version
    ///
    /// Refuses a document that [`load`](Self::load) could not read back.
    pub fn persist(&mut self) -> Result<(), ConfigError> {
        let bytes = encode_document(&self.document)?;
        self.write_document(&bytes)
    }

    /// Current module document
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Parsed common document
    pub fn common(&self) -> &CommonConfig {
        &self.common
    }

    /// The registered observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// The registered observer, mutably
    ///
    /// The node drives its sensor module through this accessor: the module
    /// is the observer, so it lives inside the store.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// The underlying blob store
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn write_document(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.storage
            .write(&self.module_path, bytes)
            .map_err(|e| ConfigError::Storage(embedded_io::Error::kind(&e).into()))
    }

    fn read_document(&mut self, path: &str) -> Result<ConfigDocument, ConfigError> {
        let mut buf = vec![0u8; MAX_DOCUMENT_SIZE];
        let len = self
            .storage
            .read(path, &mut buf)
            .map_err(|e| ConfigError::Storage(embedded_io::Error::kind(&e).into()))?;

        let value: serde_json::Value =
            serde_json::from_slice(&buf[..len]).map_err(|_| ConfigError::Parse)?;
        match value {
            serde_json::Value::Object(document) => Ok(document),
            _ => Err(ConfigError::NotAnObject),
        }
    }
}

/// Serialize `document`, refusing anything the load buffer cannot hold
fn encode_document(document: &ConfigDocument) -> Result<Vec<u8>, ConfigError> {
    let bytes = serde_json::to_vec(document).map_err(|_| ConfigError::Serialize)?;
    if bytes.len() > MAX_DOCUMENT_SIZE {
        warn!(
            "Config document of {} bytes exceeds {} byte limit",
            bytes.len(),
            MAX_DOCUMENT_SIZE
        );
        return Err(ConfigError::DocumentTooLarge);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{doc, MemoryStore, RecordingObserver};
    use serde_json::json;

    fn store_with(files: &[(&str, &str)]) -> ConfigStore<MemoryStore, RecordingObserver> {
        let mut storage = MemoryStore::default();
        for (name, content) in files {
            storage.insert(name, content.as_bytes());
        }
        ConfigStore::new(storage, "distance", RecordingObserver::default())
    }

    #[test]
    fn test_load_missing_documents_uses_defaults() {
        let mut store = store_with(&[]);
        store.load();
        assert!(store.document().is_empty());
        assert_eq!(store.common(), &CommonConfig::default());
        // Observer is told about the (empty) boot document
        assert_eq!(store.observer().changes.len(), 1);
    }

    #[test]
    fn test_load_reads_both_documents() {
        let mut store = store_with(&[
            (
                "/common/config.json",
                r#"{"mqtt_server":"10.0.0.2","mqtt_port":1884}"#,
            ),
            ("/distance/config.json", r#"{"buffer_size":20}"#),
        ]);
        store.load();
        assert_eq!(store.common().mqtt_server, "10.0.0.2");
        assert_eq!(store.common().mqtt_port, 1884);
        assert_eq!(store.document(), &doc(json!({"buffer_size": 20})));
        assert_eq!(store.observer().changes[0], doc(json!({"buffer_size": 20})));
    }

    #[test]
    fn test_load_rejects_corrupt_module_document() {
        let mut store = store_with(&[("/distance/config.json", "{not json")]);
        store.load();
        assert!(store.document().is_empty());

        let mut store = store_with(&[("/distance/config.json", "[1,2,3]")]);
        store.load();
        assert!(store.document().is_empty());
    }

    #[test]
    fn test_merge_adds_and_overwrites_keys() {
        let mut store = store_with(&[]);
        store.load();

        store.merge(doc(json!({"a": 1}))).unwrap();
        store.merge(doc(json!({"b": 2}))).unwrap();
        assert_eq!(store.document(), &doc(json!({"a": 1, "b": 2})));

        store.merge(doc(json!({"a": 2}))).unwrap();
        assert_eq!(store.document(), &doc(json!({"a": 2, "b": 2})));
    }

    #[test]
    fn test_merge_persists_full_document() {
        let mut store = store_with(&[("/distance/config.json", r#"{"keep":true}"#)]);
        store.load();
        store.merge(doc(json!({"buffer_size": 50}))).unwrap();

        let stored = store.storage_mut().get("/distance/config.json").unwrap();
        let stored: serde_json::Value = serde_json::from_slice(&stored).unwrap();
        assert_eq!(stored, json!({"buffer_size": 50, "keep": true}));
    }

    #[test]
    fn test_merge_keeps_stored_key_order() {
        let mut store = store_with(&[("/distance/config.json", r#"{"b":1,"a":2}"#)]);
        store.load();
        store.merge(doc(json!({"c": 4}))).unwrap();
        store.merge(doc(json!({"a": 3}))).unwrap();

        let stored = store.storage_mut().get("/distance/config.json").unwrap();
        assert_eq!(stored, br#"{"b":1,"a":3,"c":4}"#);
    }

    #[test]
    fn test_merge_notifies_observer_with_full_document() {
        let mut store = store_with(&[("/distance/config.json", r#"{"keep":1}"#)]);
        store.load();
        store.merge(doc(json!({"new": 2}))).unwrap();

        let changes = &store.observer().changes;
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1], doc(json!({"keep": 1, "new": 2})));
    }

    #[test]
    fn test_persist_failure_keeps_memory_authoritative() {
        let mut store = store_with(&[]);
        store.load();
        store.storage_mut().fail_writes = true;

        let result = store.merge(doc(json!({"buffer_size": 7})));
        assert_eq!(result, Err(ConfigError::Storage(StorageFault::Other)));
        assert_eq!(store.document(), &doc(json!({"buffer_size": 7})));
        assert_eq!(store.observer().changes.len(), 2);
    }

    #[test]
    fn test_merge_refuses_document_that_cannot_be_reloaded() {
        let filler = "x".repeat(3000);
        let mut store = store_with(&[]);
        store.load();
        store.merge(doc(json!({"label": filler.clone()}))).unwrap();
        store.merge(doc(json!({"buffer_size": 20}))).unwrap();
        let before = store.document().clone();

        let result = store.merge(doc(json!({"notes": filler})));
        assert_eq!(result, Err(ConfigError::DocumentTooLarge));
        assert_eq!(store.document(), &before);
        assert_eq!(store.observer().changes.len(), 3);

        // What was saved still loads after a restart
        let saved = store.storage_mut().get("/distance/config.json").unwrap();
        assert!(saved.len() <= MAX_DOCUMENT_SIZE);
        let mut restarted = store_with(&[]);
        restarted.storage_mut().insert("/distance/config.json", &saved);
        restarted.load();
        assert_eq!(restarted.document(), &before);
        assert_eq!(restarted.document()["buffer_size"], json!(20));
    }
}
