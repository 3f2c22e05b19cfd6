//! Schema-driven validation plus the cross-field rules of each type.

use super::reference::{currency_exponent, is_known_country, is_known_currency, is_known_error_code};
use super::schema::{Cardinality, FieldSpec, Format, SubField, schema_for};
use super::{FieldValue, MAX_ID_LEN, Message, MessageType};
use crate::error::{ErrorKind, ProtocolError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use tracing::debug;

/// Rule run after every field passed its own format check.
pub type CrossFieldRule = fn(&Message) -> Result<(), ProtocolError>;

pub fn validate(msg: &Message, known_extensions: &HashSet<String>) -> Result<(), ProtocolError> {
    validate_header(msg)?;
    validate_extensions(msg, known_extensions)?;
    let schema = schema_for(msg.kind());
    for spec in schema.fields {
        validate_field(msg, spec)?;
    }
    (schema.rules)(msg)
}

fn validate_header(msg: &Message) -> Result<(), ProtocolError> {
    let id_len = msg.id().chars().count();
    if id_len == 0 {
        return Err(ProtocolError::missing(msg.id(), "Message/@id"));
    }
    if id_len > MAX_ID_LEN {
        return Err(ProtocolError::invalid(
            msg.id(),
            "Message/@id",
            format!("id is {id_len} characters, at most {MAX_ID_LEN} allowed"),
        ));
    }
    if msg.version().is_empty() {
        return Err(ProtocolError::missing(msg.id(), "version"));
    }
    Ok(())
}

fn validate_extensions(
    msg: &Message,
    known_extensions: &HashSet<String>,
) -> Result<(), ProtocolError> {
    for extension in msg.extensions() {
        if extension.name.is_empty() {
            return Err(ProtocolError::missing(msg.id(), "Extension/@id"));
        }
        if extension.critical && !known_extensions.contains(&extension.name) {
            return Err(
                ProtocolError::new(ErrorKind::UnsupportedCriticalExtension, msg.id())
                    .with_field("Extension")
                    .with_detail(format!(
                        "critical extension {} not recognised",
                        extension.name
                    )),
            );
        }
        if !extension.critical && !known_extensions.contains(&extension.name) {
            debug!(extension = %extension.name, "ignoring unrecognised extension");
        }
    }
    Ok(())
}

fn validate_field(msg: &Message, spec: &FieldSpec) -> Result<(), ProtocolError> {
    let value = msg.field(spec.name);
    match (spec.cardinality, value) {
        (Cardinality::Required, None) => Err(ProtocolError::missing(msg.id(), spec.path)),
        (Cardinality::Required, Some(FieldValue::Text(text))) if text.is_empty() => {
            Err(ProtocolError::missing(msg.id(), spec.path))
        }
        (Cardinality::Optional, None) => Ok(()),
        (Cardinality::Optional, Some(FieldValue::Text(text))) if text.is_empty() => Ok(()),
        (Cardinality::Required | Cardinality::Optional, Some(FieldValue::Text(text))) => {
            check_format(msg.id(), spec.path, text, spec.format)
        }
        (Cardinality::Required | Cardinality::Optional, Some(_)) => Err(ProtocolError::invalid(
            msg.id(),
            spec.path,
            "element may occur at most once",
        )),
        (Cardinality::Repeated, None) => Ok(()),
        // A lone text value would come back from the wire as a list.
        (Cardinality::Repeated, Some(FieldValue::Text(_))) => Err(ProtocolError::invalid(
            msg.id(),
            spec.path,
            "repeated element must be given as a list",
        )),
        (Cardinality::Repeated, Some(FieldValue::List(values))) => values
            .iter()
            .try_for_each(|value| check_format(msg.id(), spec.path, value, spec.format)),
        (Cardinality::Repeated, Some(FieldValue::Records(records))) => match spec.format {
            Format::Group(sub_fields) => records.iter().try_for_each(|record| {
                sub_fields.iter().try_for_each(|sub| {
                    check_sub_field(msg.id(), spec.path, record.get(sub.name), sub)
                })
            }),
            _ => Err(ProtocolError::invalid(
                msg.id(),
                spec.path,
                "element has unexpected children",
            )),
        },
    }
}

fn check_sub_field(
    id: &str,
    parent: &str,
    value: Option<&String>,
    sub: &SubField,
) -> Result<(), ProtocolError> {
    let path = format!("{parent}/{}", sub.name);
    match value.filter(|value| !value.is_empty()) {
        None if sub.required => Err(ProtocolError::missing(id, path)),
        None => Ok(()),
        Some(value) => check_format(id, &path, value, sub.format),
    }
}

fn check_format(id: &str, path: &str, value: &str, format: Format) -> Result<(), ProtocolError> {
    let invalid = |detail: String| Err(ProtocolError::invalid(id, path, detail));
    match format {
        Format::Text { min, max } => {
            let len = value.chars().count();
            if len < min || len > max {
                return invalid(format!("length {len} outside {min}..={max}"));
            }
        }
        Format::Digits { min, max } => {
            if !is_digits(value) {
                return invalid("must contain digits only".to_string());
            }
            if value.len() < min || value.len() > max {
                return invalid(format!("length {} outside {min}..={max}", value.len()));
            }
        }
        Format::OneOf(allowed) => {
            if !allowed.contains(&value) {
                return invalid(format!("{value:?} is not one of {allowed:?}"));
            }
        }
        Format::Currency => {
            if value.len() != 3 || !is_known_currency(value) {
                return invalid(format!("{value:?} is not an ISO 4217 currency code"));
            }
        }
        Format::Country => {
            if value.len() != 3 || !is_known_country(value) {
                return invalid(format!("{value:?} is not an ISO 3166 country code"));
            }
        }
        Format::Timestamp => {
            if value.len() != 17
                || NaiveDateTime::parse_from_str(value, "%Y%m%d %H:%M:%S").is_err()
            {
                return invalid("expected YYYYMMDD HH:MM:SS".to_string());
            }
        }
        Format::Date => {
            if value.len() != 8 || NaiveDate::parse_from_str(value, "%Y%m%d").is_err() {
                return invalid("expected YYYYMMDD".to_string());
            }
        }
        Format::Base64 { len } => {
            if value.len() != len {
                return invalid(format!("expected {len} base64 characters"));
            }
            if STANDARD.decode(value).is_err() {
                return invalid("not valid base64".to_string());
            }
        }
        Format::Url { max } => {
            if value.len() > max {
                return invalid(format!("url longer than {max} characters"));
            }
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return invalid("url must be http or https".to_string());
            }
        }
        Format::Group(_) => {
            return invalid("group element given a text value".to_string());
        }
    }
    Ok(())
}

pub(crate) fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn path(kind: MessageType, name: &str) -> String {
    schema_for(kind).path_of(name)
}

fn conditionally_missing(msg: &Message, name: &str, reason: &str) -> ProtocolError {
    ProtocolError::inconsistent(msg.id(), path(msg.kind(), name), reason.to_string()).with_code("3")
}

/// Detail and vendor code only make sense next to a code.
fn ireq_rules(msg: &Message) -> Result<(), ProtocolError> {
    let has_code = msg.get_non_empty("iReqCode").is_some();
    let has_context = msg.get_non_empty("iReqDetail").is_some()
        || msg.get_non_empty("vendorCode").is_some();
    if has_context && !has_code {
        return Err(conditionally_missing(
            msg,
            "iReqCode",
            "iReqCode required when iReqDetail or vendorCode is present",
        ));
    }
    Ok(())
}

fn exponent_rules(msg: &Message) -> Result<(), ProtocolError> {
    let (Some(currency), Some(exponent)) =
        (msg.get_non_empty("currency"), msg.get_non_empty("exponent"))
    else {
        return Ok(());
    };
    let expected = currency_exponent(currency).ok_or_else(|| {
        ProtocolError::invalid(msg.id(), path(msg.kind(), "currency"), "unknown currency")
    })?;
    if exponent != expected.to_string() {
        return Err(ProtocolError::inconsistent(
            msg.id(),
            path(msg.kind(), "exponent"),
            format!("exponent {exponent} does not match {expected} for currency {currency}"),
        ));
    }
    Ok(())
}

fn recur_rules(msg: &Message) -> Result<(), ProtocolError> {
    let frequency = msg.get_non_empty("frequency").is_some();
    let end = msg.get_non_empty("endRecur").is_some();
    if frequency != end {
        let missing = if frequency { "endRecur" } else { "frequency" };
        return Err(conditionally_missing(
            msg,
            missing,
            "recurring frequency and end date must be given together",
        ));
    }
    Ok(())
}

pub(crate) fn no_rules(_msg: &Message) -> Result<(), ProtocolError> {
    Ok(())
}

pub(crate) fn enrollment_response_rules(msg: &Message) -> Result<(), ProtocolError> {
    if msg.get("enrolled") == Some("Y") {
        for name in ["acctID", "url"] {
            if msg.get_non_empty(name).is_none() {
                return Err(conditionally_missing(msg, name, "required when enrolled is Y"));
            }
        }
        if msg.list("protocol").is_empty() {
            return Err(conditionally_missing(
                msg,
                "protocol",
                "at least one protocol required when enrolled is Y",
            ));
        }
    } else if let Some(code) = msg.get_non_empty("iReqCode")
        && code.len() > 2
    {
        return Err(ProtocolError::inconsistent(
            msg.id(),
            "IReq/iReqCode",
            format!("iReqCode {code:?} longer than 2 characters"),
        ));
    }
    ireq_rules(msg)
}

pub(crate) fn challenge_request_rules(msg: &Message) -> Result<(), ProtocolError> {
    exponent_rules(msg)?;
    recur_rules(msg)
}

pub(crate) fn challenge_response_rules(msg: &Message) -> Result<(), ProtocolError> {
    match msg.get("status").unwrap_or_default() {
        "Y" | "A" => {
            for name in ["cavv", "eci", "cavvAlgorithm"] {
                if msg.get_non_empty(name).is_none() {
                    return Err(conditionally_missing(
                        msg,
                        name,
                        "required when status is Y or A",
                    ));
                }
            }
            let eci = msg.get("eci").unwrap_or_default();
            if eci.len() != 2 || !is_digits(eci) {
                return Err(ProtocolError::inconsistent(
                    msg.id(),
                    "TX/eci",
                    "eci must be 2 digits",
                ));
            }
            let algorithm = msg.get("cavvAlgorithm").unwrap_or_default();
            if !is_digits(algorithm) {
                return Err(ProtocolError::inconsistent(
                    msg.id(),
                    "TX/cavvAlgorithm",
                    "cavvAlgorithm must be numeric",
                ));
            }
        }
        "U" | "N" => {
            let pan = msg.get("pan").unwrap_or_default();
            if !pan.bytes().all(|b| b == b'0') {
                return Err(ProtocolError::inconsistent(
                    msg.id(),
                    "pan",
                    "pan must be all zeros when status is U or N",
                ));
            }
        }
        _ => {}
    }
    exponent_rules(msg)?;
    ireq_rules(msg)
}

pub(crate) fn card_range_response_rules(msg: &Message) -> Result<(), ProtocolError> {
    for record in msg.records("CR") {
        let begin = record.get("begin").and_then(|v| v.parse::<u64>().ok());
        let end = record.get("end").and_then(|v| v.parse::<u64>().ok());
        if let (Some(begin), Some(end)) = (begin, end)
            && begin > end
        {
            return Err(ProtocolError::inconsistent(
                msg.id(),
                "CR/begin",
                format!("range begin {begin} after end {end}"),
            ));
        }
    }
    ireq_rules(msg)
}

pub(crate) fn error_rules(msg: &Message) -> Result<(), ProtocolError> {
    // The allow-list is informational only; peers send codes outside it.
    if let Some(code) = msg.get("errorCode")
        && !is_known_error_code(code)
    {
        debug!(code, id = msg.id(), "accepting unlisted error code");
    }
    Ok(())
}

pub(crate) fn verify_request_rules(msg: &Message) -> Result<(), ProtocolError> {
    if msg.get_non_empty("exponent").is_some() && msg.get_non_empty("currency").is_none() {
        return Err(conditionally_missing(
            msg,
            "currency",
            "currency required when exponent is given",
        ));
    }
    exponent_rules(msg)?;
    recur_rules(msg)
}

pub(crate) fn auth_response_rules(msg: &Message) -> Result<(), ProtocolError> {
    if matches!(msg.get("status"), Some("Y" | "A")) {
        for name in ["cavv", "eci"] {
            if msg.get_non_empty(name).is_none() {
                return Err(conditionally_missing(
                    msg,
                    name,
                    "required when status is Y or A",
                ));
            }
        }
    }
    exponent_rules(msg)
}
