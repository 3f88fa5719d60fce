//! `RocksDB` ledger implementation.
//!
//! This module provides the `RocksLedger` implementation of the `Ledger` trait.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use tokio::sync::Mutex;

use threadlog_core::{Address, Instruction, Ledger, LedgerResult, Record, RecordKind, UserId};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::program::{self, LedgerRead, WriteSet};
use crate::schema::{all_column_families, cf};

/// RocksDB-backed ledger.
pub struct RocksLedger {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl RocksLedger {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_record(&self, address: &Address) -> Result<Option<Record>> {
        let cf = self.cf(cf::RECORDS)?;
        let key = keys::record_key(address);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_records(&self, kind: RecordKind) -> Result<Vec<(Address, Record)>> {
        let cf_by_kind = self.cf(cf::RECORDS_BY_KIND)?;
        let prefix = keys::kind_prefix(kind);

        let iter = self.db.iterator_cf(
            &cf_by_kind,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut records = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;

            if !key.starts_with(&prefix) {
                break;
            }

            let address = keys::address_from_kind_key(&key)?;
            match self.get_record(&address)? {
                Some(record) => records.push((address, record)),
                None => {
                    tracing::warn!(kind = %kind, address = %address, "Kind index points at missing record");
                }
            }
        }

        Ok(records)
    }

    /// Commit a write set atomically, maintaining the kind index.
    fn commit(&self, writes: WriteSet) -> Result<usize> {
        let cf_records = self.cf(cf::RECORDS)?;
        let cf_by_kind = self.cf(cf::RECORDS_BY_KIND)?;

        let count = writes.len();
        let mut batch = WriteBatch::default();
        for (address, record) in writes.iter() {
            let value = Self::serialize(record)?;
            batch.put_cf(&cf_records, keys::record_key(address), &value);
            batch.put_cf(&cf_by_kind, keys::kind_index_key(record.kind(), address), []); // Index entry (empty value)
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(count)
    }
}

impl LedgerRead for RocksLedger {
    fn read(&self, address: &Address) -> LedgerResult<Option<Record>> {
        Ok(self.get_record(address)?)
    }
}

#[async_trait]
impl Ledger for RocksLedger {
    // =========================================================================
    // Reads
    // =========================================================================

    async fn fetch(&self, address: &Address) -> LedgerResult<Option<Record>> {
        Ok(self.get_record(address)?)
    }

    async fn fetch_all(&self, kind: RecordKind) -> LedgerResult<Vec<(Address, Record)>> {
        Ok(self.list_records(kind)?)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    async fn create_and_append(
        &self,
        kind: RecordKind,
        address: &Address,
        seeds: &[Vec<u8>],
        record: Record,
    ) -> LedgerResult<()> {
        let _guard = self.write_lock.lock().await;
        let writes = program::create_and_append(self, kind, address, seeds, record)?;
        let count = self.commit(writes)?;

        tracing::info!(kind = %kind, address = %address, writes = count, "Record created");
        Ok(())
    }

    async fn submit_mutation(&self, instruction: Instruction, signer: &UserId) -> LedgerResult<()> {
        let now = chrono::Utc::now().timestamp();
        let _guard = self.write_lock.lock().await;
        let writes = program::execute(self, &instruction, signer, now).map_err(|e| {
            tracing::debug!(instruction = instruction.name(), signer = %signer, error = %e, "Mutation rejected");
            e
        })?;
        let count = self.commit(writes)?;

        tracing::info!(
            instruction = instruction.name(),
            signer = %signer,
            writes = count,
            "Mutation applied"
        );
        Ok(())
    }
}
