//! # quorum-cache
//!
//! The request-result cache the sync bridge mutates and the screens read.
//!
//! - **`QueryKey`**: typed cache addressing shared by the bridge (writer of
//!   invalidations) and the data-fetching call sites, replacing the informal
//!   string convention with a closed enumeration
//! - **`ResultCache`**: the command surface the bridge writes through —
//!   invalidate (mark stale), replace (overwrite with a pushed payload),
//!   evict (remove outright)
//! - **`MemoryCache`**: in-memory implementation with freshness tracking and
//!   command stats
//!
//! All commands are idempotent, and commute per key except eviction, which
//! dominates: an evicted entry stays absent no matter how many invalidations
//! for the same key land in the same pass.

#![deny(unsafe_code)]

pub mod key;
pub mod store;

pub use key::QueryKey;
pub use store::{CacheStats, Entry, Freshness, MemoryCache, ResultCache};
