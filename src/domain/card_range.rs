use crate::domain::message::Record;
use serde::Deserialize;

/// What a card range delta entry does to the enrolled set.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(from = "String")]
pub enum RangeAction {
    Add,
    Delete,
    /// Kept so that the cache can reject the whole delta.
    Unrecognized(String),
}

impl RangeAction {
    pub fn code(&self) -> &str {
        match self {
            RangeAction::Add => "A",
            RangeAction::Delete => "D",
            RangeAction::Unrecognized(code) => code,
        }
    }
}

impl From<String> for RangeAction {
    fn from(code: String) -> Self {
        match code.trim() {
            "A" | "a" | "add" => RangeAction::Add,
            "D" | "d" | "delete" => RangeAction::Delete,
            _ => RangeAction::Unrecognized(code),
        }
    }
}

impl From<&str> for RangeAction {
    fn from(code: &str) -> Self {
        Self::from(code.to_string())
    }
}

/// A contiguous PAN interval with the action to apply to it.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct CardRange {
    pub begin: u64,
    pub end: u64,
    pub action: RangeAction,
}

impl CardRange {
    pub fn new(begin: u64, end: u64, action: RangeAction) -> Self {
        Self { begin, end, action }
    }

    pub fn add(begin: u64, end: u64) -> Self {
        Self::new(begin, end, RangeAction::Add)
    }

    pub fn delete(begin: u64, end: u64) -> Self {
        Self::new(begin, end, RangeAction::Delete)
    }

    /// Builds a range from a `CR` record of a card-range response.
    pub fn from_record(record: &Record) -> Option<Self> {
        let begin = parse_pan(record.get("begin")?)?;
        let end = parse_pan(record.get("end")?)?;
        let action = RangeAction::from(record.get("action")?.as_str());
        Some(Self { begin, end, action })
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("begin".to_string(), self.begin.to_string());
        record.insert("end".to_string(), self.end.to_string());
        record.insert("action".to_string(), self.action.code().to_string());
        record
    }
}

/// Numeric value of a PAN or PAN bound; `None` unless all digits.
pub fn parse_pan(pan: &str) -> Option<u64> {
    let pan = pan.trim();
    if pan.is_empty() || !pan.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    pan.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_range_deserialization() {
        let csv = "begin, end, action\n4000000000000000, 4999999999999999, A\n100000, 199999, D";
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv.as_bytes());
        let ranges: Vec<CardRange> = reader.deserialize().map(|r| r.unwrap()).collect();

        assert_eq!(ranges[0], CardRange::add(4_000_000_000_000_000, 4_999_999_999_999_999));
        assert_eq!(ranges[1], CardRange::delete(100_000, 199_999));
    }

    #[test]
    fn test_unrecognized_action_is_preserved() {
        let action = RangeAction::from("X");
        assert_eq!(action, RangeAction::Unrecognized("X".to_string()));
        assert_eq!(action.code(), "X");
    }

    #[test]
    fn test_record_conversion() {
        let range = CardRange::add(100_000, 199_999);
        let record = range.to_record();
        assert_eq!(record.get("action").map(String::as_str), Some("A"));
        assert_eq!(CardRange::from_record(&record), Some(range));
    }

    #[test]
    fn test_parse_pan() {
        assert_eq!(parse_pan("4111111111111111"), Some(4_111_111_111_111_111));
        assert_eq!(parse_pan("41x1"), None);
        assert_eq!(parse_pan(""), None);
        assert_eq!(parse_pan("99999999999999999999999"), None);
    }
}
