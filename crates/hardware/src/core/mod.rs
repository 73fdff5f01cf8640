//! Channel core.
//!
//! This module contains the storage units (cache, tracker, response buffer)
//! and the orchestrating channel that evaluates them once per tick.

/// Cached request/response channel and its arbitration.
pub mod channel;

/// Cache, outstanding-request tracker and response buffer.
pub mod units;

pub use self::channel::CachedChannel;
