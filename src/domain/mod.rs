//! Domain layer: connection identity, the wire message model, and the
//! connection registry that fans broadcasts out to live sockets.

pub mod chat_message;
pub mod connection_id;
pub mod registry;

pub use chat_message::ChatMessage;
pub use connection_id::ConnectionId;
pub use registry::{BroadcastOutcome, ConnectionHandle, ConnectionRegistry};
