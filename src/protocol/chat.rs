//! # Chat Snapshots
//!
//! A downloadable chat is framed by a [`ChatEnvelope`] naming the method
//! that encoded it, so the format of the body can evolve without breaking
//! older snapshots:
//!
//! ```text
//! [CHAT_ENVELOPE tag(8)] [String method name] [method-specific body]
//! ```
//!
//! Methods are registered with a [`MethodRegistry`]. When decoding, the
//! highest-priority registered method that supports the named format reads
//! the body. The built-in [`Csm25122901`] writes a [`Chat`] as
//!
//! ```text
//! [CHAT_SNAPSHOT tag(8)] [ChatInformation] [UserMessageHistory]
//! ```

use crate::config::{Limits, DEFAULT_METHOD_PRIORITY, MAX_METHOD_PRIORITY, MIN_METHOD_PRIORITY};
use crate::core::primitives::WireString;
use crate::core::serializable::{Deserializable, Serializable};
use crate::core::tag::{tags, Tag};
use crate::error::{ProtocolError, Result};
use crate::protocol::chat_info::ChatInformation;
use crate::protocol::history::UserMessageHistory;
use std::fmt;
use std::io::{Read, Write};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// A chat: its identity and its messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub info: ChatInformation,
    pub history: UserMessageHistory,
}

impl Chat {
    pub fn new(info: ChatInformation, history: UserMessageHistory) -> Self {
        Self { info, history }
    }
}

impl Serializable for Chat {
    const TAG: Tag = tags::CHAT_SNAPSHOT;

    fn write_payload<W: Write + ?Sized>(&self, output: &mut W) -> Result<()> {
        self.info.serialize(output)?;
        self.history.serialize(output)
    }
}

impl Deserializable for Chat {
    type Context = Limits;

    fn read_payload<R: Read + ?Sized>(input: &mut R, limits: &Limits) -> Result<Self> {
        let info = ChatInformation::deserialize(input, limits)?;
        let history = UserMessageHistory::deserialize(input, limits)?;
        Ok(Self { info, history })
    }
}

/// A named encoding of a [`Chat`] body.
pub trait ChatSerializationMethod: Send + Sync {
    /// Name written to the envelope.
    fn name(&self) -> &str;

    /// Preference among methods supporting the same name, in
    /// `[MIN_METHOD_PRIORITY, MAX_METHOD_PRIORITY]`.
    fn priority(&self) -> f64 {
        DEFAULT_METHOD_PRIORITY
    }

    /// Whether this method can read bodies written by `method_name`.
    fn supports(&self, method_name: &str) -> bool {
        method_name == self.name()
    }

    fn serialize_chat(&self, output: &mut dyn Write, chat: &Chat) -> Result<()>;

    fn deserialize_chat(&self, input: &mut dyn Read, limits: &Limits) -> Result<Chat>;
}

/// Snapshot format of December 2025: a tagged [`Chat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Csm25122901;

impl Csm25122901 {
    pub const NAME: &'static str = "CSM25122901";
    pub const PRIORITY: f64 = 1.5;
}

impl ChatSerializationMethod for Csm25122901 {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn priority(&self) -> f64 {
        Self::PRIORITY
    }

    fn serialize_chat(&self, output: &mut dyn Write, chat: &Chat) -> Result<()> {
        chat.serialize(output)
    }

    fn deserialize_chat(&self, input: &mut dyn Read, limits: &Limits) -> Result<Chat> {
        Chat::deserialize(input, limits)
    }
}

/// Set of chat serialization methods available to a peer.
pub struct MethodRegistry {
    limits: Limits,
    methods: RwLock<Vec<Arc<dyn ChatSerializationMethod>>>,
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl MethodRegistry {
    /// Empty registry decoding with `limits`.
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            methods: RwLock::new(Vec::new()),
        }
    }

    /// Registry holding the built-in methods.
    pub fn with_builtin(limits: Limits) -> Result<Self> {
        let registry = Self::new(limits);
        registry.register(Arc::new(Csm25122901))?;
        Ok(registry)
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Add a method.
    ///
    /// # Errors
    /// Returns `ProtocolError::ConfigError` if the method's name is empty or
    /// longer than `max_method_name_length`, or its priority lies outside
    /// `[MIN_METHOD_PRIORITY, MAX_METHOD_PRIORITY]`.
    pub fn register(&self, method: Arc<dyn ChatSerializationMethod>) -> Result<()> {
        let name_chars = method.name().chars().count();
        if name_chars == 0 || name_chars > self.limits.max_method_name_length {
            return Err(ProtocolError::ConfigError(format!(
                "chat serialization method name must be 1 to {} characters: '{}'",
                self.limits.max_method_name_length,
                method.name()
            )));
        }
        let priority = method.priority();
        if !(MIN_METHOD_PRIORITY..=MAX_METHOD_PRIORITY).contains(&priority) {
            return Err(ProtocolError::ConfigError(format!(
                "priority of '{}' must be between {MIN_METHOD_PRIORITY} and {MAX_METHOD_PRIORITY} inclusive, got {priority}",
                method.name()
            )));
        }

        let mut methods = self.methods.write().map_err(|_| {
            ProtocolError::ConfigError("Failed to acquire write lock on method registry".to_string())
        })?;
        debug!(method = method.name(), priority, "Registered chat serialization method");
        methods.push(method);
        Ok(())
    }

    /// Names of the registered methods, in registration order.
    pub fn names(&self) -> Result<Vec<String>> {
        let methods = self.read_methods()?;
        Ok(methods.iter().map(|m| m.name().to_string()).collect())
    }

    /// Highest-priority method supporting `method_name`. Among equal
    /// priorities the earliest registered wins.
    pub fn select(&self, method_name: &str) -> Result<Arc<dyn ChatSerializationMethod>> {
        let methods = self.read_methods()?;
        let mut best: Option<&Arc<dyn ChatSerializationMethod>> = None;
        for method in methods.iter().filter(|m| m.supports(method_name)) {
            if best.map_or(true, |b| method.priority() > b.priority()) {
                best = Some(method);
            }
        }
        best.cloned().ok_or_else(|| {
            ProtocolError::framing(format!(
                "unsupported chat serialization method '{method_name}'"
            ))
        })
    }

    fn read_methods(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, Vec<Arc<dyn ChatSerializationMethod>>>> {
        self.methods.read().map_err(|_| {
            ProtocolError::ConfigError("Failed to acquire read lock on method registry".to_string())
        })
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("limits", &self.limits)
            .field("methods", &self.names().unwrap_or_default())
            .finish()
    }
}

/// A chat together with the method that encodes it.
#[derive(Clone)]
pub struct ChatEnvelope {
    method: Arc<dyn ChatSerializationMethod>,
    chat: Chat,
}

impl ChatEnvelope {
    pub fn new(method: Arc<dyn ChatSerializationMethod>, chat: Chat) -> Self {
        Self { method, chat }
    }

    /// Envelope using the built-in snapshot method.
    pub fn builtin(chat: Chat) -> Self {
        Self::new(Arc::new(Csm25122901), chat)
    }

    pub fn method(&self) -> &Arc<dyn ChatSerializationMethod> {
        &self.method
    }

    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    pub fn into_chat(self) -> Chat {
        self.chat
    }
}

impl fmt::Debug for ChatEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatEnvelope")
            .field("method", &self.method.name())
            .field("chat", &self.chat)
            .finish()
    }
}

impl Serializable for ChatEnvelope {
    const TAG: Tag = tags::CHAT_ENVELOPE;

    fn write_payload<W: Write + ?Sized>(&self, mut output: &mut W) -> Result<()> {
        WireString::serialize_str(&mut *output, self.method.name())?;
        self.method.serialize_chat(&mut output, &self.chat)
    }
}

impl Deserializable for ChatEnvelope {
    type Context = MethodRegistry;

    fn read_payload<R: Read + ?Sized>(mut input: &mut R, registry: &MethodRegistry) -> Result<Self> {
        let limits = registry.limits();
        let WireString(name) = WireString::deserialize(&mut *input, &limits.max_method_name_length)?;
        let method = registry.select(&name)?;
        let chat = method.deserialize_chat(&mut input, limits)?;
        Ok(Self { method, chat })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::protocol::message::UserMessage;
    use crate::protocol::user::User;
    use uuid::Uuid;

    fn chat() -> Chat {
        let alice = User::random("Alice");
        let bob = User::random("Bob");
        Chat::new(
            ChatInformation::new(Uuid::new_v4(), "general"),
            UserMessageHistory::from(vec![
                UserMessage::new(alice.clone(), "hello", 10.0),
                UserMessage::new(bob, "hi Alice", 11.25),
                UserMessage::new(alice, "bye", 12.5),
            ]),
        )
    }

    /// Reads snapshots like the built-in method, at a chosen priority.
    struct Alias {
        priority: f64,
    }

    impl ChatSerializationMethod for Alias {
        fn name(&self) -> &str {
            "alias"
        }

        fn priority(&self) -> f64 {
            self.priority
        }

        fn supports(&self, method_name: &str) -> bool {
            method_name == "alias" || method_name == Csm25122901::NAME
        }

        fn serialize_chat(&self, output: &mut dyn Write, chat: &Chat) -> Result<()> {
            chat.serialize(output)
        }

        fn deserialize_chat(&self, input: &mut dyn Read, limits: &Limits) -> Result<Chat> {
            Chat::deserialize(input, limits)
        }
    }

    #[test]
    fn test_envelope_roundtrip() {
        let registry = MethodRegistry::with_builtin(Limits::default()).unwrap();
        let envelope = ChatEnvelope::builtin(chat());
        let bytes = envelope.to_bytes().unwrap();

        let decoded = ChatEnvelope::from_bytes(&bytes, &registry).unwrap();
        assert_eq!(decoded.method().name(), Csm25122901::NAME);
        assert_eq!(decoded.chat(), envelope.chat());
    }

    #[test]
    fn test_envelope_layout() {
        let chat = chat();
        let bytes = ChatEnvelope::builtin(chat.clone()).to_bytes().unwrap();
        let name_len = 8 + 8 + Csm25122901::NAME.len();

        assert_eq!(&bytes[..8], &tags::CHAT_ENVELOPE.to_bytes());
        assert_eq!(&bytes[8 + name_len..], chat.to_bytes().unwrap().as_ref());
    }

    #[test]
    fn test_unknown_method_rejected() {
        let registry = MethodRegistry::new(Limits::default());
        let bytes = ChatEnvelope::builtin(chat()).to_bytes().unwrap();
        let err = ChatEnvelope::from_bytes(&bytes, &registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Framing);
    }

    #[test]
    fn test_highest_priority_method_selected() {
        let registry = MethodRegistry::with_builtin(Limits::default()).unwrap();
        registry.register(Arc::new(Alias { priority: 0.5 })).unwrap();
        assert_eq!(registry.select(Csm25122901::NAME).unwrap().name(), Csm25122901::NAME);

        registry.register(Arc::new(Alias { priority: 9.0 })).unwrap();
        let selected = registry.select(Csm25122901::NAME).unwrap();
        assert_eq!(selected.name(), "alias");
        assert_eq!(selected.priority(), 9.0);
    }

    #[test]
    fn test_register_rejects_bad_priority() {
        let registry = MethodRegistry::default();
        for priority in [-0.1, 10.5, f64::NAN] {
            assert!(matches!(
                registry.register(Arc::new(Alias { priority })),
                Err(ProtocolError::ConfigError(_))
            ));
        }
        assert!(registry.register(Arc::new(Alias { priority: 10.0 })).is_ok());
        assert_eq!(registry.names().unwrap(), vec!["alias".to_string()]);
    }

    #[test]
    fn test_register_rejects_long_name() {
        let registry = MethodRegistry::new(Limits {
            max_method_name_length: 4,
            ..Limits::default()
        });
        assert!(registry.register(Arc::new(Alias { priority: 1.0 })).is_err());
        assert!(registry.register(Arc::new(Csm25122901)).is_err());
    }
}
