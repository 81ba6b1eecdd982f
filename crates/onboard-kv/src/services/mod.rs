//! User source implementations

pub mod demo;
pub mod memory;
pub mod redis_source;

pub use demo::demo_users;
pub use memory::InMemoryUserSource;
pub use redis_source::RedisUserSource;
