//! In-memory TTL cache for Skycast.
//!
//! A single-lock map from string keys to values with per-entry expiry.
//! Expired entries are dropped lazily on read and in bulk by
//! [`TtlCache::cleanup_expired`], which the [`Sweeper`] runs on an interval.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod sweeper;

pub use cache::{CacheConfig, CacheStats, TtlCache};
pub use sweeper::Sweeper;
