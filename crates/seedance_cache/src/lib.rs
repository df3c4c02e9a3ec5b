//! Response caching for deterministic text generation requests.
//!
//! Only requests with `temperature == 0` have a [`Fingerprint`]; everything
//! else bypasses the cache. Entries live for a configured TTL and the cache
//! holds at most `max_size` entries, evicting the oldest insertion first.

#![warn(missing_docs)]

mod cache;
mod config;
mod fingerprint;

pub use cache::{CachedEntry, ResponseCache};
pub use config::ResponseCacheConfig;
pub use fingerprint::{Fingerprint, fingerprint};
