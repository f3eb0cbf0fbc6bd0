//! Messages pushed from the relay to its clients.

use serde::Serialize;
use serde_json::Value;

/// Welcome text sent to every new connection.
pub const WELCOME_TEXT: &str = "Welcome to the chat!";

/// Text broadcast when a connection closes.
pub const USER_LEFT_TEXT: &str = "A user has left the chat";

/// Text broadcast when the watched page changes on disk.
pub const RELOAD_TEXT: &str = "Page needs reload";

/// Server → client frame.
///
/// Serialized with a `type` discriminator:
///
/// ```json
/// {"type":"system","message":"Welcome to the chat!"}
/// {"type":"reload","message":"Page needs reload"}
/// {"type":"message","username":"alice","message":"hi"}
/// ```
///
/// Relayed chat fields keep whatever JSON type the client sent and are
/// left out of the frame when the client left them out.
///
/// Nothing here is persisted; a message lives only as long as its
/// serialized frame sits in the outbound queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatMessage {
    /// Server notice (welcome, departures).
    System {
        /// Notice text.
        message: String,
    },
    /// Instructs clients to refresh the page.
    Reload {
        /// Human-readable reason.
        message: String,
    },
    /// Chat line relayed from a client, copied verbatim.
    Message {
        /// Sender name as supplied by the client. Not validated.
        #[serde(skip_serializing_if = "Option::is_none")]
        username: Option<Value>,
        /// Chat text as supplied by the client.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<Value>,
    },
}

impl ChatMessage {
    /// The greeting a connection receives right after it is accepted.
    #[must_use]
    pub fn welcome() -> Self {
        Self::System {
            message: WELCOME_TEXT.to_string(),
        }
    }

    /// The notice broadcast after a connection closes.
    #[must_use]
    pub fn user_left() -> Self {
        Self::System {
            message: USER_LEFT_TEXT.to_string(),
        }
    }

    /// The reload signal broadcast on a watched-file change.
    #[must_use]
    pub fn reload() -> Self {
        Self::Reload {
            message: RELOAD_TEXT.to_string(),
        }
    }

    /// A relayed chat line.
    #[must_use]
    pub fn chat(username: Option<Value>, message: Option<Value>) -> Self {
        Self::Message { username, message }
    }

    /// Serializes the message into a JSON text frame body.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_value(msg: &ChatMessage) -> Value {
        let Ok(text) = msg.to_json() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            panic!("not valid JSON: {text}");
        };
        value
    }

    #[test]
    fn welcome_is_system_frame() {
        assert_eq!(
            as_value(&ChatMessage::welcome()),
            json!({"type": "system", "message": "Welcome to the chat!"})
        );
    }

    #[test]
    fn user_left_is_system_frame() {
        assert_eq!(
            as_value(&ChatMessage::user_left()),
            json!({"type": "system", "message": "A user has left the chat"})
        );
    }

    #[test]
    fn reload_frame_shape() {
        assert_eq!(
            as_value(&ChatMessage::reload()),
            json!({"type": "reload", "message": "Page needs reload"})
        );
    }

    #[test]
    fn chat_frame_copies_fields() {
        let msg = ChatMessage::chat(Some(json!("alice")), Some(json!("hi")));
        assert_eq!(
            as_value(&msg),
            json!({"type": "message", "username": "alice", "message": "hi"})
        );
    }

    #[test]
    fn chat_frame_escapes_content() {
        let msg = ChatMessage::chat(Some(json!("<b>\"bob\"</b>")), Some(json!("line\nbreak")));
        let value = as_value(&msg);
        assert_eq!(value["username"], "<b>\"bob\"</b>");
        assert_eq!(value["message"], "line\nbreak");
    }

    #[test]
    fn chat_frame_omits_absent_fields_and_keeps_types() {
        let msg = ChatMessage::chat(Some(json!(1)), None);
        assert_eq!(as_value(&msg), json!({"type": "message", "username": 1}));
        assert_eq!(
            as_value(&ChatMessage::chat(None, None)),
            json!({"type": "message"})
        );
        let nulls = ChatMessage::chat(Some(Value::Null), Some(json!({"nested": true})));
        assert_eq!(
            as_value(&nulls),
            json!({"type": "message", "username": null, "message": {"nested": true}})
        );
    }
}
