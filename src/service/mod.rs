//! Service layer: the relay's connection lifecycle operations.

pub mod relay_service;

pub use relay_service::{IncomingChat, RelayService};
