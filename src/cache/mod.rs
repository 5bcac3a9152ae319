// Cache module for API responses.
// In-memory TTL cache, an injectable clock, and an on-disk snapshot.

pub mod clock;
pub mod paths;
pub mod persist;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use persist::SnapshotStore;
pub use store::{CacheEntry, CacheState, CachedData, MemoryCache};
