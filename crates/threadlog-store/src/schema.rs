//! Column families used by the `RocksDB` ledger.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Ledger records, keyed by address. Values are CBOR-encoded `Record`s.
    pub const RECORDS: &str = "records";

    /// Index: records by kind, keyed by `kind_byte || address`.
    /// Value is empty (index only).
    pub const RECORDS_BY_KIND: &str = "records_by_kind";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::RECORDS, cf::RECORDS_BY_KIND]
}
