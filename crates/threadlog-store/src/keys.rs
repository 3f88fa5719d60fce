//! Key encoding for the `RocksDB` ledger.

use threadlog_core::{Address, RecordKind, ADDRESS_LEN};

use crate::error::{Result, StoreError};
use crate::schema::cf;

/// Create a record key from its address.
#[must_use]
pub fn record_key(address: &Address) -> Vec<u8> {
    address.as_bytes().to_vec()
}

/// Create a kind index key.
///
/// Format: `kind (1 byte) || address (32 bytes)`
#[must_use]
pub fn kind_index_key(kind: RecordKind, address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + ADDRESS_LEN);
    key.push(kind.as_byte());
    key.extend_from_slice(address.as_bytes());
    key
}

/// Create a prefix for iterating all records of one kind.
#[must_use]
pub fn kind_prefix(kind: RecordKind) -> [u8; 1] {
    [kind.as_byte()]
}

/// Extract the address from a kind index key.
///
/// # Errors
///
/// Returns [`StoreError::CorruptKey`] if the key has the wrong length.
pub fn address_from_kind_key(key: &[u8]) -> Result<Address> {
    if key.len() != 1 + ADDRESS_LEN {
        return Err(StoreError::CorruptKey {
            cf: cf::RECORDS_BY_KIND,
            len: key.len(),
        });
    }
    Address::from_slice(&key[1..]).map_err(|_| StoreError::CorruptKey {
        cf: cf::RECORDS_BY_KIND,
        len: key.len(),
    })
}
