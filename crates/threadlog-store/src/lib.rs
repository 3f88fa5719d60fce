//! Ledger program and storage backends for threadlog.
//!
//! The [`program`] module checks every write and turns it into a set of
//! records to commit. Two backends implement [`threadlog_core::Ledger`] on
//! top of it:
//!
//! - [`MemoryLedger`]: a `HashMap` behind an async lock, for tests and
//!   ephemeral nodes
//! - [`RocksLedger`]: persistent `RocksDB` storage (feature `rocksdb-backend`,
//!   on by default)
//!
//! Both serialize writes through a single lock and commit each write set as
//! one unit, so a mutation is either fully applied or not at all.
//!
//! # Column families
//!
//! - `records`: CBOR-encoded records, keyed by address
//! - `records_by_kind`: index for listing records of one kind
//!
//! # Example
//!
//! ```no_run
//! use threadlog_core::{Address, Instruction, Ledger, UserId};
//! use threadlog_store::RocksLedger;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = RocksLedger::open("/tmp/threadlog-db")?;
//!
//! let author = UserId::generate();
//! let post = Address::generate();
//! ledger
//!     .submit_mutation(
//!         Instruction::CreatePost {
//!             post,
//!             topic: "rust".into(),
//!             content: "hello".into(),
//!         },
//!         &author,
//!     )
//!     .await?;
//!
//! let record = ledger.fetch(&post).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
pub mod program;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryLedger;
pub use program::{LedgerRead, WriteSet};
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksLedger;
