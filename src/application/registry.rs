//! Explicit lookup table from `(type, version)` to validator and processor,
//! and from `(from, to)` type pairs to transformers.
//!
//! A `Registry` is built once at startup and shared by reference; nothing
//! in it is mutated after construction.

use super::transform;
use crate::domain::context::RequestContext;
use crate::domain::message::{Message, MessageType, SUPPORTED_VERSIONS};
use crate::error::ProtocolError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub trait MessageValidator: Send + Sync {
    fn validate(
        &self,
        msg: &Message,
        known_extensions: &HashSet<String>,
    ) -> Result<(), ProtocolError>;
}

pub trait MessageProcessor: Send + Sync {
    fn process(&self, msg: Message, ctx: &RequestContext) -> Result<Message, ProtocolError>;
}

/// Copies shared fields from one message variant into a fresh instance of
/// another. Type-specific fields are left for the caller.
pub trait MessageTransformer: Send + Sync {
    fn transform(&self, from: &Message, to: &mut Message);
}

/// Runs the declarative schema checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl MessageValidator for SchemaValidator {
    fn validate(
        &self,
        msg: &Message,
        known_extensions: &HashSet<String>,
    ) -> Result<(), ProtocolError> {
        msg.validate_with(known_extensions)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl MessageProcessor for PassThrough {
    fn process(&self, msg: Message, _ctx: &RequestContext) -> Result<Message, ProtocolError> {
        Ok(msg)
    }
}

/// Drops issuer details from an enrollment response that is not enrolled.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnrollmentResponseProcessor;

impl MessageProcessor for EnrollmentResponseProcessor {
    fn process(&self, mut msg: Message, _ctx: &RequestContext) -> Result<Message, ProtocolError> {
        if msg.get("enrolled") != Some("Y") {
            msg.remove("url");
            msg.remove("acctID");
            msg.remove("protocol");
        }
        Ok(msg)
    }
}

/// Strips authentication values from a failed or unavailable challenge.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChallengeResponseProcessor;

impl MessageProcessor for ChallengeResponseProcessor {
    fn process(&self, mut msg: Message, _ctx: &RequestContext) -> Result<Message, ProtocolError> {
        if matches!(msg.get("status"), Some("U" | "N")) {
            for name in ["cavv", "eci", "cavvAlgorithm"] {
                msg.remove(name);
            }
        }
        Ok(msg)
    }
}

#[derive(Clone)]
pub struct Handler {
    pub validator: Arc<dyn MessageValidator>,
    pub processor: Arc<dyn MessageProcessor>,
}

#[derive(Default, Clone)]
pub struct Registry {
    handlers: HashMap<(MessageType, String), Handler>,
    transformers: HashMap<(MessageType, MessageType), Arc<dyn MessageTransformer>>,
    known_extensions: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers for every message type in every supported version, plus the
    /// transformers the orchestrator relies on.
    pub fn standard() -> Self {
        let validator: Arc<dyn MessageValidator> = Arc::new(SchemaValidator);
        let pass_through: Arc<dyn MessageProcessor> = Arc::new(PassThrough);
        let mut registry = Self::new();

        for kind in MessageType::ALL {
            let processor: Arc<dyn MessageProcessor> = match kind {
                MessageType::EnrollmentResponse => Arc::new(EnrollmentResponseProcessor),
                MessageType::ChallengeResponse => Arc::new(ChallengeResponseProcessor),
                _ => Arc::clone(&pass_through),
            };
            for version in SUPPORTED_VERSIONS {
                registry = registry.with_handler(
                    kind,
                    version,
                    Arc::clone(&validator),
                    Arc::clone(&processor),
                );
            }
        }

        for (from, to, transformer) in transform::standard_transformers() {
            registry = registry.with_transformer(from, to, transformer);
        }
        registry
    }

    pub fn with_handler(
        mut self,
        kind: MessageType,
        version: &str,
        validator: Arc<dyn MessageValidator>,
        processor: Arc<dyn MessageProcessor>,
    ) -> Self {
        self.handlers.insert(
            (kind, version.to_string()),
            Handler {
                validator,
                processor,
            },
        );
        self
    }

    pub fn with_transformer(
        mut self,
        from: MessageType,
        to: MessageType,
        transformer: Arc<dyn MessageTransformer>,
    ) -> Self {
        self.transformers.insert((from, to), transformer);
        self
    }

    /// Accepts a critical extension by name.
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.known_extensions.insert(name.into());
        self
    }

    pub fn handler(&self, kind: MessageType, version: &str) -> Option<&Handler> {
        self.handlers.get(&(kind, version.to_string()))
    }

    pub fn transformer(&self, from: MessageType, to: MessageType) -> Option<&dyn MessageTransformer> {
        self.transformers.get(&(from, to)).map(Arc::as_ref)
    }

    pub fn known_extensions(&self) -> &HashSet<String> {
        &self.known_extensions
    }
}
