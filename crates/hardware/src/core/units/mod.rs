//! Storage units of the cached channel.
//!
//! This module contains the three stateful structures the channel orchestrates.
//! Each stages its updates during a tick and applies them in `commit`, so every
//! read within a tick observes the previous tick's state.

/// Set-associative response cache with pluggable replacement policies.
pub mod cache;

/// Fixed-depth FIFO of responses awaiting the upstream consumer.
pub mod response_buffer;

/// Outstanding-request tracker (content-addressable memory).
pub mod tracker;
