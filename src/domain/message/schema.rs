//! Declarative per-type field tables.
//!
//! The order of [`FieldSpec`] entries is the element order on the wire.
//! Fields that share a parent element must be adjacent.

use super::MessageType;
use super::validate::{self, CrossFieldRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Required,
    Optional,
    /// Zero or more occurrences of the same element.
    Repeated,
}

#[derive(Debug, Clone, Copy)]
pub enum Format {
    /// Free text, length counted in characters.
    Text { min: usize, max: usize },
    /// ASCII digits only.
    Digits { min: usize, max: usize },
    OneOf(&'static [&'static str]),
    /// Known ISO 4217 numeric code.
    Currency,
    /// Known ISO 3166 numeric code.
    Country,
    /// `YYYYMMDD HH:MM:SS`.
    Timestamp,
    /// `YYYYMMDD`.
    Date,
    /// Standard base64 of exactly `len` characters.
    Base64 { len: usize },
    Url { max: usize },
    /// Repeated element with its own child fields.
    Group(&'static [SubField]),
}

#[derive(Debug, Clone, Copy)]
pub struct SubField {
    pub name: &'static str,
    pub format: Format,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Slash separated element path below the type element.
    pub path: &'static str,
    pub cardinality: Cardinality,
    pub format: Format,
}

impl FieldSpec {
    /// Parent element names, without the leaf.
    pub fn parents(&self) -> Vec<&'static str> {
        let mut segments: Vec<&'static str> = self.path.split('/').collect();
        segments.pop();
        segments
    }

    pub fn leaf(&self) -> &'static str {
        self.path.rsplit('/').next().unwrap_or(self.path)
    }
}

pub struct Schema {
    pub kind: MessageType,
    pub fields: &'static [FieldSpec],
    pub rules: CrossFieldRule,
}

impl Schema {
    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Wire path of a field, falling back to its name.
    pub fn path_of(&self, name: &str) -> String {
        self.spec(name)
            .map(|spec| spec.path.to_string())
            .unwrap_or_else(|| name.to_string())
    }
}

const fn req(name: &'static str, path: &'static str, format: Format) -> FieldSpec {
    FieldSpec {
        name,
        path,
        cardinality: Cardinality::Required,
        format,
    }
}

const fn opt(name: &'static str, path: &'static str, format: Format) -> FieldSpec {
    FieldSpec {
        name,
        path,
        cardinality: Cardinality::Optional,
        format,
    }
}

const fn many(name: &'static str, path: &'static str, format: Format) -> FieldSpec {
    FieldSpec {
        name,
        path,
        cardinality: Cardinality::Repeated,
        format,
    }
}

const fn text(min: usize, max: usize) -> Format {
    Format::Text { min, max }
}

const fn digits(min: usize, max: usize) -> Format {
    Format::Digits { min, max }
}

pub const STATUS_VALUES: &[&str] = &["Y", "A", "U", "N"];
pub const ENROLLED_VALUES: &[&str] = &["Y", "N", "U"];
pub const RANGE_ACTIONS: &[&str] = &["A", "D"];

const PAN: Format = digits(13, 19);
const ACQ_BIN: Format = digits(1, 11);
const MER_ID: Format = text(1, 24);
const PASSWORD: Format = text(1, 8);
const XID: Format = Format::Base64 { len: 28 };
const CAVV: Format = Format::Base64 { len: 28 };
const PURCH_AMOUNT: Format = digits(1, 12);
const EXPONENT: Format = digits(1, 1);
const URL: Format = Format::Url { max: 2048 };
// Any numeric value is accepted; length is checked per type.
const IREQ_CODE: Format = digits(1, 3);
const DETAIL: Format = text(0, 2048);
const VENDOR_CODE: Format = text(0, 256);
const DEVICE_CATEGORY: Format = Format::OneOf(&["0", "1", "2"]);
const BROWSER_TEXT: Format = text(0, 2048);
const FREQUENCY: Format = digits(1, 4);
const INSTALL: Format = digits(1, 4);
const EXPIRY: Format = digits(4, 4);
const DESC: Format = text(0, 125);
const MERCHANT_DATA: Format = text(0, 2048);
const TRANSACTION_ID: Format = text(1, 64);
const ERROR_CODE: Format = digits(1, 3);
const ERROR_MESSAGE: Format = text(1, 256);

const CARD_RANGE: &[SubField] = &[
    SubField {
        name: "begin",
        format: digits(1, 19),
        required: true,
    },
    SubField {
        name: "end",
        format: digits(1, 19),
        required: true,
    },
    SubField {
        name: "action",
        format: Format::OneOf(RANGE_ACTIONS),
        required: true,
    },
];

const ENROLLMENT_REQUEST: &[FieldSpec] = &[
    req("pan", "pan", PAN),
    req("acqBIN", "Merchant/acqBIN", ACQ_BIN),
    req("merID", "Merchant/merID", MER_ID),
    opt("password", "Merchant/password", PASSWORD),
    opt("deviceCategory", "Browser/deviceCategory", DEVICE_CATEGORY),
    opt("accept", "Browser/accept", BROWSER_TEXT),
    opt("userAgent", "Browser/userAgent", BROWSER_TEXT),
];

const ENROLLMENT_RESPONSE: &[FieldSpec] = &[
    req("enrolled", "CH/enrolled", Format::OneOf(ENROLLED_VALUES)),
    opt("acctID", "CH/acctID", text(1, 28)),
    opt("url", "url", URL),
    many("protocol", "protocol", text(1, 32)),
    opt("iReqCode", "IReq/iReqCode", IREQ_CODE),
    opt("iReqDetail", "IReq/iReqDetail", DETAIL),
    opt("vendorCode", "IReq/vendorCode", VENDOR_CODE),
];

const CHALLENGE_REQUEST: &[FieldSpec] = &[
    req("acqBIN", "Merchant/acqBIN", ACQ_BIN),
    req("merID", "Merchant/merID", MER_ID),
    req("name", "Merchant/name", text(1, 25)),
    req("country", "Merchant/country", Format::Country),
    req("url", "Merchant/url", URL),
    req("xid", "Purchase/xid", XID),
    req("date", "Purchase/date", Format::Timestamp),
    opt("amount", "Purchase/amount", text(1, 20)),
    req("purchAmount", "Purchase/purchAmount", PURCH_AMOUNT),
    req("currency", "Purchase/currency", Format::Currency),
    req("exponent", "Purchase/exponent", EXPONENT),
    opt("desc", "Purchase/desc", DESC),
    opt("frequency", "Purchase/Recur/frequency", FREQUENCY),
    opt("endRecur", "Purchase/Recur/endRecur", Format::Date),
    opt("install", "Purchase/install", INSTALL),
    req("acctID", "CH/acctID", text(1, 28)),
    req("expiry", "CH/expiry", EXPIRY),
];

const CHALLENGE_RESPONSE: &[FieldSpec] = &[
    req("acqBIN", "Merchant/acqBIN", ACQ_BIN),
    req("merID", "Merchant/merID", MER_ID),
    req("xid", "Purchase/xid", XID),
    req("date", "Purchase/date", Format::Timestamp),
    req("purchAmount", "Purchase/purchAmount", PURCH_AMOUNT),
    req("currency", "Purchase/currency", Format::Currency),
    req("exponent", "Purchase/exponent", EXPONENT),
    req("pan", "pan", PAN),
    req("time", "TX/time", Format::Timestamp),
    req("status", "TX/status", Format::OneOf(STATUS_VALUES)),
    opt("cavv", "TX/cavv", CAVV),
    opt("eci", "TX/eci", digits(1, 2)),
    opt("cavvAlgorithm", "TX/cavvAlgorithm", digits(1, 1)),
    opt("iReqCode", "IReq/iReqCode", IREQ_CODE),
    opt("iReqDetail", "IReq/iReqDetail", DETAIL),
    opt("vendorCode", "IReq/vendorCode", VENDOR_CODE),
];

const CARD_RANGE_REQUEST: &[FieldSpec] = &[
    req("acqBIN", "Merchant/acqBIN", ACQ_BIN),
    req("merID", "Merchant/merID", MER_ID),
    opt("password", "Merchant/password", PASSWORD),
    opt("serialNumber", "serialNumber", digits(1, 20)),
];

const CARD_RANGE_RESPONSE: &[FieldSpec] = &[
    opt("serialNumber", "serialNumber", digits(1, 20)),
    many("CR", "CR", Format::Group(CARD_RANGE)),
    opt("iReqCode", "IReq/iReqCode", IREQ_CODE),
    opt("iReqDetail", "IReq/iReqDetail", DETAIL),
    opt("vendorCode", "IReq/vendorCode", VENDOR_CODE),
];

const ERROR: &[FieldSpec] = &[
    req("errorCode", "errorCode", ERROR_CODE),
    req("errorMessage", "errorMessage", ERROR_MESSAGE),
    opt("errorDetail", "errorDetail", DETAIL),
    opt("vendorCode", "vendorCode", VENDOR_CODE),
];

const VERIFY_REQUEST: &[FieldSpec] = &[
    req("merchantID", "merchantID", MER_ID),
    req("pan", "pan", PAN),
    req("expiry", "expiry", EXPIRY),
    req("purchAmount", "purchAmount", PURCH_AMOUNT),
    opt("currency", "currency", Format::Currency),
    opt("exponent", "exponent", EXPONENT),
    opt("desc", "desc", DESC),
    opt("frequency", "recurFrequency", FREQUENCY),
    opt("endRecur", "recurEnd", Format::Date),
    opt("install", "install", INSTALL),
    opt("merchantData", "merchantData", MERCHANT_DATA),
    opt("merchantURL", "merchantURL", URL),
    opt("protocol", "protocol", text(1, 32)),
    opt("deviceCategory", "Browser/deviceCategory", DEVICE_CATEGORY),
    opt("accept", "Browser/accept", BROWSER_TEXT),
    opt("userAgent", "Browser/userAgent", BROWSER_TEXT),
];

const VERIFY_RESPONSE: &[FieldSpec] = &[
    req("enrolled", "enrolled", Format::OneOf(ENROLLED_VALUES)),
    opt("transactionID", "transactionID", TRANSACTION_ID),
    opt("iReqCode", "IReq/iReqCode", IREQ_CODE),
    opt("iReqDetail", "IReq/iReqDetail", DETAIL),
    opt("vendorCode", "IReq/vendorCode", VENDOR_CODE),
    opt("acsUrl", "acsUrl", URL),
    opt("htmlForm", "htmlForm", text(1, 65_536)),
    opt("merchantData", "merchantData", MERCHANT_DATA),
];

const AUTH_REQUEST: &[FieldSpec] = &[
    req("transactionID", "transactionID", TRANSACTION_ID),
    req("paRes", "paRes", text(1, 65_536)),
    opt("merchantID", "merchantID", MER_ID),
];

const AUTH_RESPONSE: &[FieldSpec] = &[
    req("transactionID", "transactionID", TRANSACTION_ID),
    req("xid", "xid", text(1, 64)),
    req("date", "date", Format::Timestamp),
    opt("time", "time", Format::Timestamp),
    req("purchAmount", "purchAmount", PURCH_AMOUNT),
    req("currency", "currency", Format::Currency),
    req("exponent", "exponent", EXPONENT),
    req("status", "status", Format::OneOf(STATUS_VALUES)),
    opt("cavv", "cavv", text(1, 64)),
    opt("eci", "eci", digits(1, 2)),
    opt("cavvAlgorithm", "cavvAlgorithm", digits(1, 1)),
    opt("merchantData", "merchantData", MERCHANT_DATA),
    opt("merchantURL", "merchantURL", URL),
];

const LOCAL_ERROR: &[FieldSpec] = &[
    req("errorCode", "errorCode", ERROR_CODE),
    req("errorMessage", "errorMessage", ERROR_MESSAGE),
    opt("errorDetail", "errorDetail", DETAIL),
    opt("vendorCode", "vendorCode", VENDOR_CODE),
    opt("transactionID", "transactionID", TRANSACTION_ID),
];

static SCHEMAS: [Schema; 12] = [
    Schema {
        kind: MessageType::EnrollmentRequest,
        fields: ENROLLMENT_REQUEST,
        rules: validate::no_rules,
    },
    Schema {
        kind: MessageType::EnrollmentResponse,
        fields: ENROLLMENT_RESPONSE,
        rules: validate::enrollment_response_rules,
    },
    Schema {
        kind: MessageType::ChallengeRequest,
        fields: CHALLENGE_REQUEST,
        rules: validate::challenge_request_rules,
    },
    Schema {
        kind: MessageType::ChallengeResponse,
        fields: CHALLENGE_RESPONSE,
        rules: validate::challenge_response_rules,
    },
    Schema {
        kind: MessageType::CardRangeRequest,
        fields: CARD_RANGE_REQUEST,
        rules: validate::no_rules,
    },
    Schema {
        kind: MessageType::CardRangeResponse,
        fields: CARD_RANGE_RESPONSE,
        rules: validate::card_range_response_rules,
    },
    Schema {
        kind: MessageType::Error,
        fields: ERROR,
        rules: validate::error_rules,
    },
    Schema {
        kind: MessageType::VerifyRequest,
        fields: VERIFY_REQUEST,
        rules: validate::verify_request_rules,
    },
    Schema {
        kind: MessageType::VerifyResponse,
        fields: VERIFY_RESPONSE,
        rules: validate::no_rules,
    },
    Schema {
        kind: MessageType::AuthRequest,
        fields: AUTH_REQUEST,
        rules: validate::no_rules,
    },
    Schema {
        kind: MessageType::AuthResponse,
        fields: AUTH_RESPONSE,
        rules: validate::auth_response_rules,
    },
    Schema {
        kind: MessageType::LocalError,
        fields: LOCAL_ERROR,
        rules: validate::error_rules,
    },
];

pub fn schema_for(kind: MessageType) -> &'static Schema {
    SCHEMAS
        .iter()
        .find(|schema| schema.kind == kind)
        .unwrap_or_else(|| unreachable!("every message type has a schema"))
}
