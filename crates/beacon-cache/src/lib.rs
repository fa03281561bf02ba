//! # beacon-cache
//!
//! Shared-cache plumbing for Beacon:
//!
//! - **redis**: Redis-backed [`CacheProvider`], plus the durable event
//!   stream used by the queue engine
//! - **memory**: in-process provider using [moka](https://crates.io/crates/moka),
//!   for tests and single-node development
//! - **keys**: central builders for every cache key the service uses
//!
//! The provider is selected at runtime based on configuration; the event
//! bus and stream always run on Redis.
//!
//! [`CacheProvider`]: beacon_core::traits::CacheProvider

pub mod keys;
pub mod memory;
pub mod provider;
pub mod redis;

pub use provider::CacheManager;
pub use self::redis::client::RedisClient;
pub use self::redis::streams::{EventStream, StreamConsumer, StreamEntry};
