//! Diagnostics event history
//!
//! Stores a capped time-series of control-plane events (transitions,
//! bindings, rejections) recorded by the stream registry.

pub mod store;
