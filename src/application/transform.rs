//! Field mappings between message variants.

use super::registry::MessageTransformer;
use crate::domain::message::reference::currency_alpha;
use crate::domain::message::{FieldValue, Message, MessageType};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Copies each `(source, target)` field pair that is present on the source.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping(pub &'static [(&'static str, &'static str)]);

impl MessageTransformer for FieldMapping {
    fn transform(&self, from: &Message, to: &mut Message) {
        for (source, target) in self.0 {
            if let Some(value) = from.field(source) {
                to.insert_field(target, value.clone());
            }
        }
    }
}

/// Same names on both sides.
const fn same(name: &'static str) -> (&'static str, &'static str) {
    (name, name)
}

const VERIFY_TO_ENROLLMENT: FieldMapping = FieldMapping(&[
    same("pan"),
    same("deviceCategory"),
    same("accept"),
    same("userAgent"),
]);

const VERIFY_TO_CHALLENGE: FieldMapping = FieldMapping(&[
    same("purchAmount"),
    same("currency"),
    same("exponent"),
    same("desc"),
    same("frequency"),
    same("endRecur"),
    same("install"),
    same("expiry"),
]);

const VERIFY_TO_VERIFY_RESPONSE: FieldMapping = FieldMapping(&[same("merchantData")]);

const ENROLLMENT_TO_CHALLENGE: FieldMapping = FieldMapping(&[same("acctID")]);

const ENROLLMENT_TO_VERIFY_RESPONSE: FieldMapping = FieldMapping(&[
    same("enrolled"),
    same("iReqCode"),
    same("iReqDetail"),
    same("vendorCode"),
    ("url", "acsUrl"),
]);

const ERROR_TO_LOCAL_ERROR: FieldMapping = FieldMapping(&[
    same("errorCode"),
    same("errorMessage"),
    same("errorDetail"),
    same("vendorCode"),
]);

const CHALLENGE_TO_AUTH_SHARED: FieldMapping = FieldMapping(&[
    same("xid"),
    same("date"),
    same("time"),
    same("purchAmount"),
    same("currency"),
    same("exponent"),
    same("status"),
]);

/// Challenge response into the merchant's authentication result. The
/// authentication values only travel with a successful status.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuthResultTransformer;

impl MessageTransformer for AuthResultTransformer {
    fn transform(&self, from: &Message, to: &mut Message) {
        CHALLENGE_TO_AUTH_SHARED.transform(from, to);
        if matches!(from.get("status"), Some("Y" | "A")) {
            for name in ["cavv", "eci", "cavvAlgorithm"] {
                if let Some(value) = from.get_non_empty(name) {
                    to.insert_field(name, FieldValue::Text(value.to_string()));
                }
            }
        }
    }
}

type Entry = (MessageType, MessageType, Arc<dyn MessageTransformer>);

fn entry(from: MessageType, to: MessageType, transformer: impl MessageTransformer + 'static) -> Entry {
    (from, to, Arc::new(transformer))
}

pub fn standard_transformers() -> Vec<Entry> {
    use MessageType::*;
    vec![
        entry(VerifyRequest, EnrollmentRequest, VERIFY_TO_ENROLLMENT),
        entry(VerifyRequest, ChallengeRequest, VERIFY_TO_CHALLENGE),
        entry(VerifyRequest, VerifyResponse, VERIFY_TO_VERIFY_RESPONSE),
        entry(EnrollmentResponse, ChallengeRequest, ENROLLMENT_TO_CHALLENGE),
        entry(EnrollmentResponse, VerifyResponse, ENROLLMENT_TO_VERIFY_RESPONSE),
        entry(ChallengeResponse, AuthResponse, AuthResultTransformer),
        entry(Error, LocalError, ERROR_TO_LOCAL_ERROR),
    ]
}

/// Cardholder-facing amount, e.g. `USD 12.34` for `1234` with exponent 2.
pub fn display_amount(purch_amount: &str, currency: &str, exponent: &str) -> Option<String> {
    let minor_units: i64 = purch_amount.parse().ok()?;
    let scale: u32 = exponent.parse().ok()?;
    let amount = Decimal::try_new(minor_units, scale).ok()?;
    let alpha = currency_alpha(currency).unwrap_or(currency);
    Some(format!("{alpha} {amount}"))
}
