//! XML wire format.
//!
//! Protocol messages travel as
//! `<ThreeDSecure><Message id="…"><VEReq>…</VEReq></Message></ThreeDSecure>`,
//! local-interface messages as `<MPI_Interface><VerifyEnrollmentReq id="…">…`.
//! The element layout below the type element comes from the schema table.

use super::schema::{Cardinality, Format, schema_for};
use super::{Envelope, Extension, FieldValue, Message, MessageType, Record};
use crate::error::{ErrorKind, ProtocolError};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

pub const PROTOCOL_ROOT: &str = "ThreeDSecure";
pub const MESSAGE_ELEMENT: &str = "Message";
pub const LOCAL_ROOT: &str = "MPI_Interface";
const EXTENSION_ELEMENT: &str = "Extension";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Minimal element tree built from the reader events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, String> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| e.to_string())?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Follows a chain of child names, taking the first match at each level.
    pub fn descend(&self, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Re-serialises the content of this element.
    pub fn inner_xml(&self) -> String {
        let mut out = escape(self.text.as_str()).into_owned();
        for child in &self.children {
            child.write_to(&mut out);
        }
        out
    }

    fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            push_attribute(out, key, value);
        }
        out.push('>');
        out.push_str(&self.inner_xml());
        close(out, &self.name);
    }
}

/// Parses a whole document into its root element.
pub fn parse_document(xml: &str) -> Result<Element, String> {
    // Text is kept verbatim; only indentation between child elements is
    // dropped, once the element is closed.
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Element::from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| "closing tag without opening tag".to_string())?;
                if !element.children.is_empty() && element.text.trim().is_empty() {
                    element.text.clear();
                }
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| e.to_string())?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "{e} at position {}",
                    reader.buffer_position()
                ));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("element {} is not closed", open.name));
    }
    root.ok_or_else(|| "document has no root element".to_string())
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), String> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err("document has more than one root element".to_string()),
    }
    Ok(())
}

fn malformed(id: &str, detail: impl Into<String>) -> ProtocolError {
    ProtocolError::new(ErrorKind::MalformedMessage, id).with_detail(detail)
}

pub fn from_wire(xml: &str) -> Result<Message, ProtocolError> {
    let root = parse_document(xml).map_err(|detail| malformed("", detail))?;

    let (kind, body, id) = match root.name.as_str() {
        PROTOCOL_ROOT => {
            let envelope = root
                .child(MESSAGE_ELEMENT)
                .ok_or_else(|| malformed("", "missing Message element"))?;
            locate_protocol_body(envelope)?
        }
        MESSAGE_ELEMENT => locate_protocol_body(&root)?,
        LOCAL_ROOT => {
            let (kind, body) = root
                .children
                .iter()
                .find_map(|child| {
                    MessageType::from_tag(Envelope::Local, &child.name).map(|kind| (kind, child))
                })
                .ok_or_else(|| {
                    ProtocolError::new(ErrorKind::UnsupportedMessage, "")
                        .with_field(LOCAL_ROOT)
                        .with_detail("no supported local interface message")
                })?;
            (kind, body, body.attribute("id").unwrap_or_default().to_string())
        }
        other => return Err(malformed("", format!("unexpected root element {other}"))),
    };

    let version = body
        .child("version")
        .map(|element| element.text.clone())
        .ok_or_else(|| ProtocolError::missing(id.as_str(), "version"))?;

    let mut msg = Message::new(kind, version, id);
    read_fields(body, &mut msg);
    for element in body.children_named(EXTENSION_ELEMENT) {
        let name = element
            .attribute("id")
            .or_else(|| element.attribute("name"))
            .unwrap_or_default();
        let critical = element
            .attribute("critical")
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        msg.add_extension(Extension::new(name, critical, element.inner_xml()));
    }
    Ok(msg)
}

fn locate_protocol_body(envelope: &Element) -> Result<(MessageType, &Element, String), ProtocolError> {
    let id = envelope.attribute("id").unwrap_or_default().to_string();
    let element = envelope
        .children
        .first()
        .ok_or_else(|| malformed(&id, "empty Message element"))?;
    let kind = MessageType::from_tag(Envelope::Protocol, &element.name).ok_or_else(|| {
        ProtocolError::new(ErrorKind::UnsupportedMessage, id.as_str())
            .with_field(element.name.clone())
            .with_detail("message type not supported")
    })?;
    Ok((kind, element, id))
}

fn read_fields(body: &Element, msg: &mut Message) {
    let schema = schema_for(msg.kind());
    for spec in schema.fields {
        let Some(parent) = body.descend(&spec.parents()) else {
            continue;
        };
        let leaf = spec.leaf();
        match (spec.cardinality, spec.format) {
            (Cardinality::Repeated, Format::Group(_)) => {
                for element in parent.children_named(leaf) {
                    let record: Record = element
                        .children
                        .iter()
                        .map(|child| (child.name.clone(), child.text.clone()))
                        .collect();
                    msg.push_record(spec.name, record);
                }
            }
            (Cardinality::Repeated, _) => {
                for element in parent.children_named(leaf) {
                    msg.push(spec.name, element.text.clone());
                }
            }
            _ => {
                if let Some(element) = parent.child(leaf) {
                    if parent.children_named(leaf).count() > 1 {
                        debug!(field = spec.path, "duplicate element, keeping the first");
                    }
                    msg.set(spec.name, element.text.clone());
                }
            }
        }
    }
}

pub fn to_wire(msg: &Message) -> String {
    let kind = msg.kind();
    let mut out = String::with_capacity(1024);
    out.push_str(XML_DECLARATION);
    match kind.envelope() {
        Envelope::Protocol => {
            open(&mut out, PROTOCOL_ROOT);
            open_with_id(&mut out, MESSAGE_ELEMENT, msg.id());
            open(&mut out, kind.tag());
        }
        Envelope::Local => {
            open(&mut out, LOCAL_ROOT);
            open_with_id(&mut out, kind.tag(), msg.id());
        }
    }

    leaf(&mut out, "version", msg.version());
    write_fields(&mut out, msg);
    for extension in msg.extensions() {
        out.push('<');
        out.push_str(EXTENSION_ELEMENT);
        push_attribute(&mut out, "id", &extension.name);
        push_attribute(
            &mut out,
            "critical",
            if extension.critical { "true" } else { "false" },
        );
        out.push('>');
        // Payload is an XML fragment and goes out verbatim.
        out.push_str(&extension.payload);
        close(&mut out, EXTENSION_ELEMENT);
    }

    match kind.envelope() {
        Envelope::Protocol => {
            close(&mut out, kind.tag());
            close(&mut out, MESSAGE_ELEMENT);
            close(&mut out, PROTOCOL_ROOT);
        }
        Envelope::Local => {
            close(&mut out, kind.tag());
            close(&mut out, LOCAL_ROOT);
        }
    }
    out
}

fn write_fields(out: &mut String, msg: &Message) {
    let schema = schema_for(msg.kind());
    let mut open_parents: Vec<&str> = Vec::new();

    for spec in schema.fields {
        let Some(value) = msg.field(spec.name) else {
            continue;
        };
        let parents = spec.parents();
        let shared = open_parents
            .iter()
            .zip(parents.iter())
            .take_while(|(current, wanted)| current == wanted)
            .count();
        while open_parents.len() > shared {
            if let Some(name) = open_parents.pop() {
                close(out, name);
            }
        }
        for name in parents[shared..].iter().copied() {
            open(out, name);
            open_parents.push(name);
        }

        let name = spec.leaf();
        match value {
            FieldValue::Text(text) => leaf(out, name, text),
            FieldValue::List(values) => {
                for text in values {
                    leaf(out, name, text);
                }
            }
            FieldValue::Records(records) => {
                let Format::Group(sub_fields) = spec.format else {
                    continue;
                };
                for record in records {
                    open(out, name);
                    for sub in sub_fields {
                        if let Some(text) = record.get(sub.name) {
                            leaf(out, sub.name, text);
                        }
                    }
                    close(out, name);
                }
            }
        }
    }

    while let Some(name) = open_parents.pop() {
        close(out, name);
    }
}

fn open(out: &mut String, name: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
}

fn open_with_id(out: &mut String, name: &str, id: &str) {
    out.push('<');
    out.push_str(name);
    push_attribute(out, "id", id);
    out.push('>');
}

fn close(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn leaf(out: &mut String, name: &str, text: &str) {
    open(out, name);
    out.push_str(&escape(text));
    close(out, name);
}

fn push_attribute(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::VERSION_1_0_2;

    const ACS_URL: &str = "https://acs.example.com/pa";
    const XID: &str = "MDAwMDAwMDAwMDAwMDAwMDAwMDE=";
    const CAVV: &str = "AAABBBCCCDDDEEEFFFGGGHHHIII=";

    fn challenge_request() -> Message {
        let mut msg = Message::new(MessageType::ChallengeRequest, VERSION_1_0_2, "pareq-1");
        msg.set("acqBIN", "412345");
        msg.set("merID", "merchant-1");
        msg.set("name", "Tom & Jerry's <Shop>");
        msg.set("country", "840");
        msg.set("url", "https://shop.example.com");
        msg.set("xid", "MDAwMDAwMDAwMDAwMDAwMDAwMDE=");
        msg.set("date", "20260101 12:00:00");
        msg.set("purchAmount", "1234");
        msg.set("currency", "840");
        msg.set("exponent", "2");
        msg.set("frequency", "30");
        msg.set("endRecur", "20271231");
        msg.set("acctID", "account-1");
        msg.set("expiry", "2812");
        msg
    }

    #[test]
    fn test_nested_layout_follows_schema() {
        let xml = challenge_request().to_wire();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<ThreeDSecure><Message id="pareq-1"><PAReq><version>1.0.2</version><Merchant><acqBIN>412345</acqBIN>"#));
        assert!(xml.contains("<Recur><frequency>30</frequency><endRecur>20271231</endRecur></Recur></Purchase><CH>"));
        assert!(xml.ends_with("</PAReq></Message></ThreeDSecure>"));
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let xml = challenge_request().to_wire();
        assert!(xml.contains("Tom &amp; Jerry&apos;s &lt;Shop&gt;"));
        let parsed = Message::from_wire(&xml).unwrap();
        assert_eq!(parsed.get("name"), Some("Tom & Jerry's <Shop>"));
    }

    #[test]
    fn test_round_trip_keeps_fields() {
        let original = challenge_request();
        let parsed = Message::from_wire(&original.to_wire()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_signature() {
        let xml = r#"<?xml version="1.0"?>
            <ThreeDSecure>
              <Message id="abc">
                <PARes id="pr">
                  <version>1.0.2</version>
                  <TX><status>N</status></TX>
                </PARes>
                <Signature><SignedInfo/></Signature>
              </Message>
            </ThreeDSecure>"#;
        let msg = Message::from_wire(xml).unwrap();
        assert_eq!(msg.kind(), MessageType::ChallengeResponse);
        assert_eq!(msg.id(), "abc");
        assert_eq!(msg.get("status"), Some("N"));
    }

    #[test]
    fn test_bare_message_root_is_accepted() {
        let xml = r#"<Message id="e1"><Error><version>1.0.2</version><errorCode>5</errorCode><errorMessage>bad</errorMessage></Error></Message>"#;
        let msg = Message::from_wire(xml).unwrap();
        assert_eq!(msg.kind(), MessageType::Error);
        assert_eq!(msg.get("errorCode"), Some("5"));
    }

    #[test]
    fn test_repeated_elements_and_groups() {
        let xml = r#"<ThreeDSecure><Message id="c1"><CRRes><version>1.0.2</version><serialNumber>12</serialNumber>
            <CR><begin>4000</begin><end>4999</end><action>A</action></CR>
            <CR><begin>5000</begin><end>5999</end><action>D</action></CR>
            </CRRes></Message></ThreeDSecure>"#;
        let msg = Message::from_wire(xml).unwrap();
        let records = msg.records("CR");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("action").map(String::as_str), Some("D"));
        let again = Message::from_wire(&msg.to_wire()).unwrap();
        assert_eq!(again, msg);
    }

    #[test]
    fn test_extensions_round_trip() {
        let mut msg = Message::new(MessageType::EnrollmentRequest, VERSION_1_0_2, "v1");
        msg.set("pan", "4111111111111111");
        msg.set("acqBIN", "412345");
        msg.set("merID", "m1");
        msg.add_extension(Extension::new("ext.one", true, "<data a=\"1\">x</data>"));
        let parsed = Message::from_wire(&msg.to_wire()).unwrap();
        assert_eq!(parsed.extensions().len(), 1);
        assert!(parsed.extensions()[0].critical);
        assert_eq!(parsed.extensions()[0].name, "ext.one");
        assert_eq!(parsed.extensions()[0].payload, "<data a=\"1\">x</data>");
    }

    #[test]
    fn test_local_envelope() {
        let mut msg = Message::new(MessageType::AuthRequest, VERSION_1_0_2, "local-1");
        msg.set("transactionID", "tx-1");
        msg.set("paRes", "eJzz");
        let xml = msg.to_wire();
        assert!(xml.contains(r#"<MPI_Interface><AuthenticationReq id="local-1">"#));
        assert_eq!(Message::from_wire(&xml).unwrap(), msg);
    }

    #[test]
    fn test_malformed_documents() {
        let err = Message::from_wire("<ThreeDSecure><Message>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedMessage);

        let err = Message::from_wire("<Foo/>").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedMessage);

        let err = Message::from_wire(
            r#"<ThreeDSecure><Message id="x"><Bogus><version>1.0.2</version></Bogus></Message></ThreeDSecure>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedMessage);

        let err = Message::from_wire(
            r#"<ThreeDSecure><Message id="x"><VEReq><pan>1</pan></VEReq></Message></ThreeDSecure>"#,
        )
        .unwrap_err();
        assert_eq!(err.code, "3");
    }

    fn with_fields(kind: MessageType, id: &str, fields: &[(&str, &str)]) -> Message {
        let mut msg = Message::new(kind, VERSION_1_0_2, id);
        for (name, value) in fields {
            msg.set(name, *value);
        }
        msg.add_extension(Extension::new("ext.info", false, "<note lang=\"en\">hi</note>"));
        msg
    }

    fn card_range(begin: &str, end: &str, action: &str) -> Record {
        [("begin", begin), ("end", end), ("action", action)]
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// A valid instance of `kind` with every schema field present. Free
    /// text is padded to catch whitespace loss on the wire.
    fn populated(kind: MessageType) -> Message {
        let ireq = [
            ("iReqCode", "50"),
            ("iReqDetail", "  issuer note "),
            ("vendorCode", " V-1\n"),
        ];
        match kind {
            MessageType::EnrollmentRequest => with_fields(
                kind,
                "vereq-1",
                &[
                    ("pan", "4111111111111111"),
                    ("acqBIN", "412345"),
                    ("merID", " merchant 1 "),
                    ("password", "secret"),
                    ("deviceCategory", "0"),
                    ("accept", " text/html "),
                    ("userAgent", "Mozilla/5.0 (X11) "),
                ],
            ),
            MessageType::EnrollmentResponse => {
                let mut msg = with_fields(
                    kind,
                    "veres-1",
                    &[("enrolled", "Y"), ("acctID", " acct 0001 "), ("url", ACS_URL)],
                );
                for (name, value) in ireq {
                    msg.set(name, value);
                }
                msg.push("protocol", "ThreeDSecure");
                msg.push("protocol", "OtherScheme");
                msg
            }
            MessageType::ChallengeRequest => with_fields(
                kind,
                "pareq-1",
                &[
                    ("acqBIN", "412345"),
                    ("merID", " merchant 1 "),
                    ("name", " Tom & Jerry's <Shop> "),
                    ("country", "840"),
                    ("url", "https://shop.example.com"),
                    ("xid", XID),
                    ("date", "20260101 12:00:00"),
                    ("amount", "USD 12.34"),
                    ("purchAmount", "1234"),
                    ("currency", "840"),
                    ("exponent", "2"),
                    ("desc", "  two  books "),
                    ("frequency", "30"),
                    ("endRecur", "20271231"),
                    ("install", "3"),
                    ("acctID", " acct 0001 "),
                    ("expiry", "2812"),
                ],
            ),
            MessageType::ChallengeResponse => {
                let mut msg = with_fields(
                    kind,
                    "pareq-1",
                    &[
                        ("acqBIN", "412345"),
                        ("merID", " merchant 1 "),
                        ("xid", XID),
                        ("date", "20260101 12:00:00"),
                        ("purchAmount", "1234"),
                        ("currency", "840"),
                        ("exponent", "2"),
                        ("pan", "0000000000001111"),
                        ("time", "20260101 12:03:00"),
                        ("status", "Y"),
                        ("cavv", CAVV),
                        ("eci", "05"),
                        ("cavvAlgorithm", "2"),
                    ],
                );
                for (name, value) in ireq {
                    msg.set(name, value);
                }
                msg
            }
            MessageType::CardRangeRequest => with_fields(
                kind,
                "crreq-1",
                &[
                    ("acqBIN", "412345"),
                    ("merID", " merchant 1 "),
                    ("password", "secret"),
                    ("serialNumber", "12"),
                ],
            ),
            MessageType::CardRangeResponse => {
                let mut msg = with_fields(kind, "crreq-1", &[("serialNumber", "13")]);
                for (name, value) in ireq {
                    msg.set(name, value);
                }
                msg.push_record("CR", card_range("4000000000000000", "4999999999999999", "A"));
                msg.push_record("CR", card_range("5000000000000000", "5999999999999999", "D"));
                msg
            }
            MessageType::Error | MessageType::LocalError => {
                let mut msg = with_fields(
                    kind,
                    "err-1",
                    &[
                        ("errorCode", "5"),
                        ("errorMessage", " Format of one or more elements is invalid "),
                        ("errorDetail", " Purchase/xid: bad\n"),
                        ("vendorCode", " V-1 "),
                    ],
                );
                if kind == MessageType::LocalError {
                    msg.set("transactionID", "0123456789abcdef");
                }
                msg
            }
            MessageType::VerifyRequest => with_fields(
                kind,
                "verify-1",
                &[
                    ("merchantID", " merchant 1 "),
                    ("pan", "4111111111111111"),
                    ("expiry", "2812"),
                    ("purchAmount", "1234"),
                    ("currency", "840"),
                    ("exponent", "2"),
                    ("desc", "  two  books "),
                    ("frequency", "30"),
                    ("endRecur", "20271231"),
                    ("install", "3"),
                    ("merchantData", " order 7\n"),
                    ("merchantURL", "https://shop.example.com/return"),
                    ("protocol", "ThreeDSecure"),
                    ("deviceCategory", "1"),
                    ("accept", " text/html "),
                    ("userAgent", "Mozilla/5.0 (X11) "),
                ],
            ),
            MessageType::VerifyResponse => {
                let mut msg = with_fields(
                    kind,
                    "verify-1",
                    &[
                        ("enrolled", "Y"),
                        ("transactionID", "0123456789abcdef"),
                        ("acsUrl", ACS_URL),
                        ("htmlForm", "<form action=\"x\">\n  <input name=\"MD\"/>\n</form>\n"),
                        ("merchantData", " order 7\n"),
                    ],
                );
                for (name, value) in ireq {
                    msg.set(name, value);
                }
                msg
            }
            MessageType::AuthRequest => with_fields(
                kind,
                "auth-1",
                &[
                    ("transactionID", "0123456789abcdef"),
                    ("paRes", "eJzz\nSM3JyQcA"),
                    ("merchantID", " merchant 1 "),
                ],
            ),
            MessageType::AuthResponse => with_fields(
                kind,
                "auth-1",
                &[
                    ("transactionID", "0123456789abcdef"),
                    ("xid", XID),
                    ("date", "20260101 12:00:00"),
                    ("time", "20260101 12:03:00"),
                    ("purchAmount", "1234"),
                    ("currency", "840"),
                    ("exponent", "2"),
                    ("status", "Y"),
                    ("cavv", CAVV),
                    ("eci", "05"),
                    ("cavvAlgorithm", "2"),
                    ("merchantData", " order 7\n"),
                    ("merchantURL", "https://shop.example.com/return"),
                ],
            ),
        }
    }

    #[test]
    fn test_every_variant_round_trips() {
        for kind in MessageType::ALL {
            let msg = populated(kind);
            for spec in schema_for(kind).fields {
                assert!(msg.contains(spec.name), "{kind}: {} not populated", spec.name);
            }
            if let Err(err) = msg.validate() {
                panic!("{kind} sample is invalid: {err}");
            }

            let parsed = Message::from_wire(&msg.to_wire()).unwrap();
            assert_eq!(parsed, msg, "{kind} changed on the wire");
        }
    }

    #[test]
    fn test_free_text_keeps_surrounding_whitespace() {
        let parsed = Message::from_wire(&populated(MessageType::VerifyRequest).to_wire()).unwrap();
        assert_eq!(parsed.get("desc"), Some("  two  books "));
        assert_eq!(parsed.get("merchantData"), Some(" order 7\n"));

        let parsed = Message::from_wire(&populated(MessageType::ChallengeRequest).to_wire()).unwrap();
        assert_eq!(parsed.get("name"), Some(" Tom & Jerry's <Shop> "));
    }

    #[test]
    fn test_repeated_field_reads_back_as_list() {
        let parsed = Message::from_wire(&populated(MessageType::EnrollmentResponse).to_wire()).unwrap();
        assert_eq!(parsed.list("protocol"), ["ThreeDSecure", "OtherScheme"]);
    }
}
