// LedgerStore - Persistent key-value storage using sled
//
// Provides typed access for storing:
// - Ledger configuration (token + custody address)
// - Ledger state (campaigns and donation records)
// - Reference-token balances

use crate::config::LedgerConfig;
use crate::ledger::{LedgerState, LedgerStateError};
use crate::token::TokenBalances;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use std::path::Path;
use thiserror::Error;

/// Key prefixes for organizing data
mod keys {
    pub const LEDGER_CONFIG: &[u8] = b"config:ledger";
    pub const LEDGER_STATE: &[u8] = b"ledger:state";
    pub const TOKEN_BALANCES: &[u8] = b"token:balances";
}

/// Errors from storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to open database: {0}")]
    OpenFailed(String),

    #[error("Database operation failed: {0}")]
    DatabaseError(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Flush failed: {0}")]
    FlushFailed(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}

/// Statistics about the storage
#[derive(Clone, Debug)]
pub struct StorageStats {
    /// Number of keys in the database
    pub key_count: usize,
    /// Approximate disk size in bytes
    pub disk_size_bytes: u64,
}

/// Persistent store for a deployed ledger
///
/// Uses sled for crash-safe, embedded storage.
/// All writes are atomic and durable after flush.
pub struct LedgerStore {
    db: sled::Db,
}

impl LedgerStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        Ok(Self { db })
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.db.is_empty())
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db
            .flush()
            .map_err(|e| StoreError::FlushFailed(e.to_string()))?;
        Ok(())
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StoreError> {
        Ok(StorageStats {
            key_count: self.db.len(),
            disk_size_bytes: self.db.size_on_disk().unwrap_or(0),
        })
    }

    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?.map(|v| v.to_vec()))
    }

    // ========================================================================
    // DEPLOYMENT
    // ========================================================================

    /// Whether a ledger has been deployed into this store
    pub fn is_deployed(&self) -> Result<bool, StoreError> {
        Ok(self.db.contains_key(keys::LEDGER_CONFIG)?)
    }

    /// Save the ledger configuration
    pub fn save_config(&self, config: &LedgerConfig) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(config)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.db.insert(keys::LEDGER_CONFIG, bytes)?;
        Ok(())
    }

    /// Load the ledger configuration
    pub fn load_config(&self) -> Result<Option<LedgerConfig>, StoreError> {
        match self.get_raw(keys::LEDGER_CONFIG)? {
            Some(bytes) => {
                let config = postcard::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // LEDGER STATE PERSISTENCE
    // ========================================================================

    /// Save the ledger state
    pub fn save_state(&self, state: &LedgerState) -> Result<(), StoreError> {
        self.db.insert(keys::LEDGER_STATE, state.to_bytes())?;
        Ok(())
    }

    /// Load the ledger state
    pub fn load_state(&self) -> Result<Option<LedgerState>, StoreError> {
        match self.get_raw(keys::LEDGER_STATE)? {
            Some(bytes) => {
                let state = LedgerState::from_bytes(&bytes)
                    .map_err(|e: LedgerStateError| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    // ========================================================================
    // TOKEN BALANCES
    // ========================================================================

    /// Save reference-token balances
    pub fn save_balances(&self, balances: &TokenBalances) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(balances)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;
        self.db.insert(keys::TOKEN_BALANCES, bytes)?;
        Ok(())
    }

    /// Load reference-token balances
    pub fn load_balances(&self) -> Result<Option<TokenBalances>, StoreError> {
        match self.get_raw(keys::TOKEN_BALANCES)? {
            Some(bytes) => {
                let balances = postcard::from_bytes(&bytes)
                    .map_err(|e| StoreError::DeserializationFailed(e.to_string()))?;
                Ok(Some(balances))
            }
            None => Ok(None),
        }
    }

    /// Save ledger state and token balances in one sled transaction
    ///
    /// The two must never diverge on disk: a donation moves funds and
    /// records them in the same step.
    pub fn commit(&self, state: &LedgerState, balances: &TokenBalances) -> Result<(), StoreError> {
        let state_bytes = state.to_bytes();
        let balance_bytes = postcard::to_allocvec(balances)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        self.db
            .transaction(|tx| {
                tx.insert(keys::LEDGER_STATE, state_bytes.as_slice())?;
                tx.insert(keys::TOKEN_BALANCES, balance_bytes.as_slice())?;
                Ok::<(), ConflictableTransactionError<()>>(())
            })
            .map_err(|e: TransactionError<()>| StoreError::DatabaseError(format!("{:?}", e)))?;

        self.flush()
    }
}
