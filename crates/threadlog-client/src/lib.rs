//! Threadlog client SDK.
//!
//! [`Threadlog`] drives the comment log over any [`threadlog_core::Ledger`]:
//! it appends comments to fixed-size pages, reads every page of a post back
//! concurrently into reply threads, and records likes, tips and follows.
//! [`HttpLedger`] is the ledger to use against a running `threadlog-service`.
//!
//! # Example
//!
//! ```no_run
//! use threadlog_client::{HttpLedger, Threadlog};
//! use threadlog_core::{ParentRef, UserId};
//!
//! # async fn example() -> Result<(), threadlog_client::ClientError> {
//! let client = Threadlog::new(HttpLedger::new("http://threadlog:8080")?);
//! let author = UserId::generate();
//!
//! let post = client.create_post(&author, "rust", "Pages of ten").await?;
//! let first = client.add_comment(&post, &author, "first!", ParentRef::Root).await?;
//! client
//!     .add_comment(&post, &author, "replying", ParentRef::Parent(first))
//!     .await?;
//!
//! let view = client.read_thread(&post).await?;
//! for (depth, node) in view.forest.iter() {
//!     println!("{}{}", "  ".repeat(depth), node.comment.content);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod feed;
mod http;
mod interactions;
mod reader;
mod types;
mod writer;

pub use client::Threadlog;
pub use error::ClientError;
pub use http::{ClientOptions, HttpLedger};
pub use types::*;
