//! Persistent store abstraction.
//!
//! The board persists two independent string records: the JSON-encoded
//! cell values and the onboarding marker. Backends only need simple
//! get/set/remove on string keys.

use std::collections::HashMap;

/// Key holding the JSON object of cell id -> text.
pub const BOARD_KEY: &str = "harada.board.v1";

/// Key holding the "has onboarded before" marker. Absent = new user.
pub const ONBOARDED_KEY: &str = "harada.newUser";

/// Value written to [`ONBOARDED_KEY`] once onboarding completes.
pub const ONBOARDED_VALUE: &str = "false";

/// Error from a store backend.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Backend could not be reached (missing directory, locked database)
    Unavailable(String),
    /// Write rejected for lack of space
    QuotaExceeded(String),
    /// Read or write failed
    Io(String),
    /// Stored payload could not be decoded
    Corrupt(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            StoreError::QuotaExceeded(msg) => write!(f, "Storage full: {}", msg),
            StoreError::Io(msg) => write!(f, "Storage I/O error: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "Stored board is corrupt: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Key/value string storage used by the board.
pub trait BoardStore {
    /// Read a record. `Ok(None)` when the key was never written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a record, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a record. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

impl<S: BoardStore + ?Sized> BoardStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// In-memory store. Used by tests and as a fallback when no durable
/// backend can be opened.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing failure injection.
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    /// Make every subsequent read fail.
    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent write and remove fail.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw access for assertions.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl BoardStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("memory store read disabled".to_string()));
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::QuotaExceeded("memory store write disabled".to_string()));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("memory store write disabled".to_string()));
        }
        self.entries.remove(key);
        Ok(())
    }
}
