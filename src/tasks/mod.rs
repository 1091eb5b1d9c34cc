//! Background Tasks Module
//!
//! Contains background tasks coupled to a cache instance's lifetime.
//!
//! # Tasks
//! - TTL Cleanup: removes expired cache entries at configured intervals

mod cleanup;

pub(crate) use cleanup::spawn_cleanup_task;
