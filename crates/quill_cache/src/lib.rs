//! Incremental cache of prover runs.
//!
//! Annotating a document is expensive, so the result of each run is kept on
//! disk next to the inputs that produced it. A later run with exactly the
//! same chunks and prover configuration reuses the stored annotation instead
//! of invoking the prover again.
//!
//! One cache file holds the entries of a single document, one per input
//! language. The file is opened right before annotation and persisted right
//! after, and is only rewritten when its contents (or the requested
//! compression) actually changed.

#![warn(missing_docs)]

pub mod compression;
pub mod entry;
pub mod error;
pub mod file_set;
pub mod format;

pub use compression::Compression;
pub use entry::CacheEntry;
pub use error::CacheError;
pub use file_set::{CacheSet, FileCacheSet};
pub use format::{CacheRecord, CACHE_VERSION};
