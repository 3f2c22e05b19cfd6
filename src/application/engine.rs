use super::registry::{Handler, Registry};
use crate::domain::context::RequestContext;
use crate::domain::message::{Message, MessageType};
use crate::error::{ErrorKind, ProtocolError};
use std::sync::Arc;
use tracing::debug;

/// Version-aware validation, processing and transformation of messages.
///
/// `ProtocolEngine` is stateless apart from the registry it was built with and
/// can be shared freely between concurrent requests.
#[derive(Clone)]
pub struct ProtocolEngine {
    registry: Arc<Registry>,
}

impl ProtocolEngine {
    /// Creates a new `ProtocolEngine`.
    ///
    /// # Arguments
    ///
    /// * `registry` - Handlers and transformers, fixed for the engine's lifetime.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    fn handler(&self, msg: &Message) -> Result<&Handler, ProtocolError> {
        self.registry
            .handler(msg.kind(), msg.version())
            .ok_or_else(|| {
                ProtocolError::new(ErrorKind::UnsupportedMessage, msg.id()).with_detail(format!(
                    "no handler for {} version {}",
                    msg.kind(),
                    msg.version()
                ))
            })
    }

    /// Validates a message against the handler registered for its type and
    /// version.
    pub fn validate(&self, msg: &Message) -> Result<(), ProtocolError> {
        self.handler(msg)?
            .validator
            .validate(msg, self.registry.known_extensions())
    }

    /// Validates, then runs the type-specific processor.
    ///
    /// Validation failures are returned as-is; the message is never handed to
    /// a processor unless it is valid.
    pub fn process(&self, msg: Message, ctx: &RequestContext) -> Result<Message, ProtocolError> {
        let handler = self.handler(&msg)?;
        handler
            .validator
            .validate(&msg, self.registry.known_extensions())?;
        debug!(id = msg.id(), kind = %msg.kind(), version = msg.version(), "message valid");
        handler.processor.process(msg, ctx)
    }

    /// Builds a fresh `to` message from `from`, with a new id and the same
    /// version.
    pub fn transform(&self, from: &Message, to: MessageType) -> Result<Message, ProtocolError> {
        let mut out = Message::with_new_id(to, from.version());
        self.transform_into(from, &mut out)?;
        Ok(out)
    }

    /// Copies the mapped fields of `from` onto an existing message.
    pub fn transform_into(&self, from: &Message, to: &mut Message) -> Result<(), ProtocolError> {
        let transformer = self
            .registry
            .transformer(from.kind(), to.kind())
            .ok_or_else(|| {
                ProtocolError::new(ErrorKind::UnsupportedMessage, from.id()).with_detail(format!(
                    "no transformation from {} to {}",
                    from.kind(),
                    to.kind()
                ))
            })?;
        transformer.transform(from, to);
        Ok(())
    }
}
