//! onboard-kv: user records from a Redis-compatible key-value store
//!
//! Reads user hashes stored under `user:*` keys, typically on an Upstash
//! instance reached over TLS. An in-memory source with a small demo dataset
//! is provided for tests and offline runs.

pub mod error;
pub mod services;
pub mod upstash;

pub use error::KvError;
pub use services::{demo_users, InMemoryUserSource, RedisUserSource};
pub use upstash::{parse_upstash_url, UpstashEndpoint};
