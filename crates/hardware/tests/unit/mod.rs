//! # Unit Components
//!
//! Tests for each part of the channel model, exercised through the public API.





/// Unit tests for the simulation harness and file loading.
pub mod sim;
