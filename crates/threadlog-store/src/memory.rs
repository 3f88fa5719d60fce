//! In-process ledger backed by a `HashMap`.
//!
//! Used by tests across the workspace and by the service when
//! `STORAGE_BACKEND=memory`. Addresses can be marked unavailable to simulate
//! failed fetches.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use threadlog_core::{
    Address, Instruction, Ledger, LedgerError, LedgerResult, Record, RecordKind, UserId,
};

use crate::program::{self, WriteSet};

/// Ledger kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<HashMap<Address, Record>>,
    unavailable: Mutex<HashSet<Address>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make fetches of `address` fail with a transport error.
    pub async fn make_unavailable(&self, address: Address) {
        self.unavailable.lock().await.insert(address);
    }

    /// Undo [`MemoryLedger::make_unavailable`].
    pub async fn make_available(&self, address: &Address) {
        self.unavailable.lock().await.remove(address);
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the ledger is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn commit(records: &mut HashMap<Address, Record>, writes: WriteSet) -> usize {
        let count = writes.len();
        records.extend(writes.into_writes());
        count
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn fetch(&self, address: &Address) -> LedgerResult<Option<Record>> {
        if self.unavailable.lock().await.contains(address) {
            return Err(LedgerError::Transport(format!("{address} unavailable")));
        }
        Ok(self.records.read().await.get(address).cloned())
    }

    async fn fetch_all(&self, kind: RecordKind) -> LedgerResult<Vec<(Address, Record)>> {
        let records = self.records.read().await;
        let mut matching: Vec<_> = records
            .iter()
            .filter(|(_, record)| record.kind() == kind)
            .map(|(address, record)| (*address, record.clone()))
            .collect();
        matching.sort_by_key(|(address, _)| *address);
        Ok(matching)
    }

    async fn create_and_append(
        &self,
        kind: RecordKind,
        address: &Address,
        seeds: &[Vec<u8>],
        record: Record,
    ) -> LedgerResult<()> {
        let mut records = self.records.write().await;
        let writes = program::create_and_append(&*records, kind, address, seeds, record)?;
        let count = Self::commit(&mut records, writes);

        tracing::info!(kind = %kind, address = %address, writes = count, "Record created");
        Ok(())
    }

    async fn submit_mutation(&self, instruction: Instruction, signer: &UserId) -> LedgerResult<()> {
        let now = chrono::Utc::now().timestamp();
        let mut records = self.records.write().await;
        let writes = program::execute(&*records, &instruction, signer, now).map_err(|e| {
            tracing::debug!(instruction = instruction.name(), signer = %signer, error = %e, "Mutation rejected");
            e
        })?;
        let count = Self::commit(&mut records, writes);

        tracing::info!(
            instruction = instruction.name(),
            signer = %signer,
            writes = count,
            "Mutation applied"
        );
        Ok(())
    }
}
