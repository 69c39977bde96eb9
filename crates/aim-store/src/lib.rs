//! Persistence for processed FAST UI submissions.
//!
//! Records are stored in one SQLite table keyed by a SHA-256 hash of the
//! raw record's canonical JSON, so resubmitting identical content is
//! detected instead of stored twice.

pub mod error;
pub mod hash;
pub mod store;

pub use error::{Result, StoreError};
pub use hash::{canonical_json, content_hash};
pub use store::{NameGroup, RecordStore, SaveOutcome, StoreStats, StoredRecord};
