//! # chat-relay
//!
//! A WebSocket chat relay with live-reload notifications, and a small
//! streaming uppercase file copier. The two share nothing but this crate.
//!
//! ## Relay
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── Page + catch-all handlers (api/)
//!     ├── WS upgrade + connection loop (ws/)
//!     │
//!     ├── RelayService (service/)          ◄── FileWatcher (watcher)
//!     │
//!     └── ConnectionRegistry (domain/)
//! ```
//!
//! Every chat payload a client sends is relayed to all open connections,
//! the sender included. Modifying the watched page broadcasts a reload.
//!
//! ## Copier
//!
//! [`copier::copy_uppercase`] reads a file in chunks, uppercases each one
//! and writes it out in order.

pub mod api;
pub mod app_state;
pub mod config;
pub mod copier;
pub mod domain;
pub mod error;
pub mod service;
pub mod telemetry;
pub mod watcher;
pub mod ws;
