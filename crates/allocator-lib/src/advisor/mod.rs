//! Configuration-time advisors
//!
//! Independent of the scaling cascade and usually run when configuration
//! is reloaded rather than on every metrics tick:
//! - Connection pool sizing from expected concurrency
//! - Cache memory partitioning across named categories

mod cache;
mod pool;

pub use cache::{
    CacheAllocator, CacheConfig, APP_RESERVE_FRACTION, DEFAULT_CACHE_WEIGHTS, FALLBACK_CATEGORY,
};
pub use pool::{
    ConnectionPoolSizer, PoolConfig, DEFAULT_QUERIES_PER_USER, MIN_POOL_SIZE,
    SPIKE_BUFFER_FRACTION,
};
