//! WebSocket layer: upgrade handling and the per-connection loop.
//!
//! Upgrades are accepted on any path.

pub mod connection;
pub mod handler;
