use crate::domain::message::{Message, MessageType};
use thiserror::Error;

/// Classification of every failure the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The document could not be parsed or its root element is wrong.
    MalformedMessage,
    /// No handler is registered for the message type and version.
    UnsupportedMessage,
    /// A single field is missing, too long, or badly formatted.
    FieldValidation,
    /// A critical extension the registry does not recognise.
    UnsupportedCriticalExtension,
    /// Fields are individually valid but contradict each other.
    CrossFieldInconsistency,
    /// No pending transaction exists for the supplied id.
    UnknownTransaction,
    /// A pending transaction outlived its TTL.
    ExpiredTransaction,
    /// The challenge response does not match the cached request.
    MatchMismatch,
    /// The issuer signature could not be verified. Degrades the result.
    SignatureUnavailable,
    /// Every configured directory URL failed.
    DirectoryUnreachable,
    /// Anything else.
    UnexpectedInternal,
}

impl ErrorKind {
    /// Protocol error code carried on the wire for this kind.
    pub fn default_code(self) -> &'static str {
        match self {
            ErrorKind::MalformedMessage => "1",
            ErrorKind::UnsupportedMessage => "2",
            ErrorKind::FieldValidation => "5",
            ErrorKind::UnsupportedCriticalExtension => "4",
            ErrorKind::CrossFieldInconsistency => "5",
            ErrorKind::UnknownTransaction => "71",
            ErrorKind::ExpiredTransaction => "70",
            ErrorKind::MatchMismatch => "5",
            ErrorKind::SignatureUnavailable => "96",
            ErrorKind::DirectoryUnreachable => "98",
            ErrorKind::UnexpectedInternal => "99",
        }
    }

    /// Short human readable message used when none is supplied.
    pub fn short_message(self) -> &'static str {
        match self {
            ErrorKind::MalformedMessage => "Root element invalid",
            ErrorKind::UnsupportedMessage => "Message not supported",
            ErrorKind::FieldValidation => "Format of one or more elements is invalid",
            ErrorKind::UnsupportedCriticalExtension => "Critical extension not recognised",
            ErrorKind::CrossFieldInconsistency => "Inconsistent element values",
            ErrorKind::UnknownTransaction => "Unknown transaction",
            ErrorKind::ExpiredTransaction => "Incomplete transaction expired",
            ErrorKind::MatchMismatch => "Response does not match request",
            ErrorKind::SignatureUnavailable => "Signature could not be verified",
            ErrorKind::DirectoryUnreachable => "Directory server unreachable",
            ErrorKind::UnexpectedInternal => "Permanent system failure",
        }
    }
}

/// Structured protocol error, returned to the immediate caller and
/// rendered as an `Error` message when it has to cross a boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {short_msg} (message {id}){}", location_suffix(.field_path, .detail))]
pub struct ProtocolError {
    pub kind: ErrorKind,
    /// Id of the message that caused the error.
    pub id: String,
    pub code: String,
    pub short_msg: String,
    /// Wire path of the offending field, e.g. `Purchase/currency`.
    pub field_path: Option<String>,
    pub detail: Option<String>,
    pub vendor_code: Option<String>,
}

impl ProtocolError {
    pub fn new(kind: ErrorKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            code: kind.default_code().to_string(),
            short_msg: kind.short_message().to_string(),
            field_path: None,
            detail: None,
            vendor_code: None,
        }
    }

    pub fn missing(id: impl Into<String>, field_path: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::FieldValidation, id)
            .with_field(field_path)
            .with_detail("required element missing");
        err.code = "3".to_string();
        err.short_msg = "Required element missing".to_string();
        err
    }

    pub fn invalid(
        id: impl Into<String>,
        field_path: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::FieldValidation, id)
            .with_field(field_path)
            .with_detail(detail)
    }

    pub fn inconsistent(
        id: impl Into<String>,
        field_path: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::CrossFieldInconsistency, id)
            .with_field(field_path)
            .with_detail(detail)
    }

    pub fn internal(id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedInternal, id).with_detail(detail)
    }

    pub fn with_field(mut self, field_path: impl Into<String>) -> Self {
        self.field_path = Some(field_path.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_vendor_code(mut self, vendor_code: impl Into<String>) -> Self {
        self.vendor_code = Some(vendor_code.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    fn render(&self, kind: MessageType, version: &str) -> Message {
        let mut msg = Message::new(kind, version, self.id.clone());
        msg.set("errorCode", self.code.clone());
        msg.set("errorMessage", self.short_msg.clone());
        let detail = match (&self.field_path, &self.detail) {
            (Some(path), Some(detail)) => Some(format!("{path}: {detail}")),
            (Some(path), None) => Some(path.clone()),
            (None, Some(detail)) => Some(detail.clone()),
            (None, None) => None,
        };
        if let Some(detail) = detail {
            msg.set("errorDetail", detail);
        }
        if let Some(vendor_code) = &self.vendor_code {
            msg.set("vendorCode", vendor_code.clone());
        }
        msg
    }

    /// Renders the error as a protocol `Error` message for a counterpart.
    pub fn to_message(&self, version: &str) -> Message {
        self.render(MessageType::Error, version)
    }

    /// Renders the error as a local-interface error for the merchant.
    pub fn to_local_message(&self, version: &str) -> Message {
        self.render(MessageType::LocalError, version)
    }
}

fn location_suffix(field_path: &Option<String>, detail: &Option<String>) -> String {
    let mut suffix = String::new();
    if let Some(path) = field_path {
        suffix.push_str(" at ");
        suffix.push_str(path);
    }
    if let Some(detail) = detail {
        suffix.push_str(": ");
        suffix.push_str(detail);
    }
    suffix
}

/// Failure of a single directory or notification round trip.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },
    #[error("response from {url} could not be decoded: {reason}")]
    Decode { url: String, reason: String },
}

/// Failure of the compression or base64 layer.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("compression error: {0}")]
    Io(#[from] std::io::Error),
    #[error("payload is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("payload inflates beyond {limit} bytes")]
    TooLarge { limit: u64 },
}

/// The signature verifier could not run at all (bad key store, bad document).
#[derive(Error, Debug)]
#[error("signature verification unavailable: {0}")]
pub struct SignatureError(pub String);

#[derive(Error, Debug)]
pub enum MpiError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MpiError>;
