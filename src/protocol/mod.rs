//! # Domain Codecs
//!
//! Wire types for users, messages, chats and message histories.
//!
//! Every type here is a tagged object and decodes against the configured
//! [`Limits`](crate::config::Limits), so the size of every name, message and
//! collection a peer can send is bounded.
//!
//! ## Components
//! - **User / UserMessage / ChatInformation**: fixed composites of the
//!   primitive codecs
//! - **UserMessageHistory**: message log with a deduplicated sender table
//! - **Chat**: snapshot envelope with named, prioritised encodings
//!
//! ## Example
//! ```rust
//! use localchat_protocol::config::Limits;
//! use localchat_protocol::core::serializable::{Deserializable, Serializable};
//! use localchat_protocol::protocol::{User, UserMessage};
//!
//! let message = UserMessage::new(User::random("Alice"), "hi", 1_700_000_000.5);
//! let bytes = message.to_bytes()?;
//! let decoded = UserMessage::from_bytes(&bytes, &Limits::default())?;
//! assert_eq!(decoded, message);
//! # Ok::<(), localchat_protocol::error::ProtocolError>(())
//! ```

pub mod chat;
pub mod chat_info;
pub mod history;
pub mod message;
pub mod user;

pub use chat::{Chat, ChatEnvelope, ChatSerializationMethod, Csm25122901, MethodRegistry};
pub use chat_info::ChatInformation;
pub use history::{UserMessageHistory, HISTORY_FORMAT_VERSION};
pub use message::UserMessage;
pub use user::User;
