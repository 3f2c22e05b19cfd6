//! Protocol message model.
//!
//! Every message variant shares one representation: a header (`id`, type,
//! version), an ordered field map and a list of extensions. What each type
//! may carry, and how, is described declaratively in [`schema`], which
//! drives both [`validate`] and the XML codec in [`wire`].

pub mod reference;
pub mod schema;
pub mod validate;
pub mod wire;

use crate::error::ProtocolError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

pub const VERSION_1_0_1: &str = "1.0.1";
pub const VERSION_1_0_2: &str = "1.0.2";

/// Protocol versions the default registry accepts.
pub const SUPPORTED_VERSIONS: [&str; 2] = [VERSION_1_0_1, VERSION_1_0_2];

/// Maximum length of a message id.
pub const MAX_ID_LEN: usize = 30;

/// Which XML envelope a message travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// `<ThreeDSecure><Message id="…">`, exchanged with directory and issuer.
    Protocol,
    /// `<MPI_Interface>`, exchanged with the merchant application.
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageType {
    EnrollmentRequest,
    EnrollmentResponse,
    ChallengeRequest,
    ChallengeResponse,
    CardRangeRequest,
    CardRangeResponse,
    Error,
    VerifyRequest,
    VerifyResponse,
    AuthRequest,
    AuthResponse,
    LocalError,
}

impl MessageType {
    pub const ALL: [MessageType; 12] = [
        MessageType::EnrollmentRequest,
        MessageType::EnrollmentResponse,
        MessageType::ChallengeRequest,
        MessageType::ChallengeResponse,
        MessageType::CardRangeRequest,
        MessageType::CardRangeResponse,
        MessageType::Error,
        MessageType::VerifyRequest,
        MessageType::VerifyResponse,
        MessageType::AuthRequest,
        MessageType::AuthResponse,
        MessageType::LocalError,
    ];

    /// Element name of the type-specific tree.
    pub fn tag(self) -> &'static str {
        match self {
            MessageType::EnrollmentRequest => "VEReq",
            MessageType::EnrollmentResponse => "VERes",
            MessageType::ChallengeRequest => "PAReq",
            MessageType::ChallengeResponse => "PARes",
            MessageType::CardRangeRequest => "CRReq",
            MessageType::CardRangeResponse => "CRRes",
            MessageType::Error => "Error",
            MessageType::VerifyRequest => "VerifyEnrollmentReq",
            MessageType::VerifyResponse => "VerifyEnrollmentRes",
            MessageType::AuthRequest => "AuthenticationReq",
            MessageType::AuthResponse => "AuthenticationRes",
            MessageType::LocalError => "Error",
        }
    }

    pub fn envelope(self) -> Envelope {
        match self {
            MessageType::VerifyRequest
            | MessageType::VerifyResponse
            | MessageType::AuthRequest
            | MessageType::AuthResponse
            | MessageType::LocalError => Envelope::Local,
            _ => Envelope::Protocol,
        }
    }

    pub fn from_tag(envelope: Envelope, tag: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.envelope() == envelope && kind.tag() == tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.envelope() {
            Envelope::Protocol => f.write_str(self.tag()),
            Envelope::Local => write!(f, "MPI_Interface/{}", self.tag()),
        }
    }
}

/// One repeated group instance, e.g. a single `CR` card range entry.
pub type Record = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Records(Vec<Record>),
}

/// Opaque protocol extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub critical: bool,
    pub payload: String,
}

impl Extension {
    pub fn new(name: impl Into<String>, critical: bool, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            critical,
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: String,
    kind: MessageType,
    version: String,
    fields: BTreeMap<String, FieldValue>,
    extensions: Vec<Extension>,
}

impl Message {
    pub fn new(kind: MessageType, version: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            version: version.into(),
            fields: BTreeMap::new(),
            extensions: Vec::new(),
        }
    }

    /// Creates a message with a freshly generated id.
    pub fn with_new_id(kind: MessageType, version: impl Into<String>) -> Self {
        Self::new(kind, version, new_message_id())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Returns a single-valued field, `None` when absent or not text.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Like [`Message::get`] but treats empty text as absent.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields
            .insert(name.to_string(), FieldValue::Text(value.into()));
    }

    /// Sets the field only when a value is given.
    pub fn set_opt(&mut self, name: &str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.set(name, value);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn insert_field(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Values of a repeated simple element.
    pub fn list(&self, name: &str) -> &[String] {
        match self.fields.get(name) {
            Some(FieldValue::List(values)) => values,
            _ => &[],
        }
    }

    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        let entry = self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::List(Vec::new()));
        match entry {
            FieldValue::List(values) => values.push(value.into()),
            other => *other = FieldValue::List(vec![value.into()]),
        }
    }

    /// Instances of a repeated group.
    pub fn records(&self, name: &str) -> &[Record] {
        match self.fields.get(name) {
            Some(FieldValue::Records(records)) => records,
            _ => &[],
        }
    }

    pub fn push_record(&mut self, name: &str, record: Record) {
        let entry = self
            .fields
            .entry(name.to_string())
            .or_insert_with(|| FieldValue::Records(Vec::new()));
        match entry {
            FieldValue::Records(records) => records.push(record),
            other => *other = FieldValue::Records(vec![record]),
        }
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn add_extension(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    /// Field-level and cross-field validation with no known extensions.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        validate::validate(self, &HashSet::new())
    }

    /// Validation accepting the given critical extension names.
    pub fn validate_with(&self, known_extensions: &HashSet<String>) -> Result<(), ProtocolError> {
        validate::validate(self, known_extensions)
    }

    pub fn to_wire(&self) -> String {
        wire::to_wire(self)
    }

    pub fn from_wire(xml: &str) -> Result<Self, ProtocolError> {
        wire::from_wire(xml)
    }
}

/// 22-character URL-safe id derived from a random UUID.
pub fn new_message_id() -> String {
    URL_SAFE_NO_PAD.encode(uuid::Uuid::new_v4().as_bytes())
}
