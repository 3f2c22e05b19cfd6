use crate::domain::card_range::{CardRange, RangeAction, parse_pan};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeCacheError {
    /// The delta was rejected as a whole; the active set is unchanged.
    #[error("invalid card range delta: {0}")]
    InvalidDelta(String),
}

/// Sorted range bounds. `begins[i]` and `ends[i]` always describe the same
/// range.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangeSnapshot {
    begins: Vec<u64>,
    ends: Vec<u64>,
}

impl RangeSnapshot {
    fn from_sets(begins: BTreeSet<u64>, ends: BTreeSet<u64>) -> Self {
        Self {
            begins: begins.into_iter().collect(),
            ends: ends.into_iter().collect(),
        }
    }

    pub fn contains(&self, pan: u64) -> bool {
        let idx = self.begins.partition_point(|begin| *begin <= pan);
        idx > 0 && self.ends.get(idx - 1).is_some_and(|end| pan <= *end)
    }

    pub fn len(&self) -> usize {
        self.begins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.begins.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
struct SchemeState {
    serial_number: Option<String>,
    active: Arc<RangeSnapshot>,
    loaded: bool,
}

/// Per-scheme set of enrolled card ranges.
///
/// Readers load the current scheme map through an `ArcSwap` and search
/// the active snapshot without taking a lock. A refresh builds its
/// replacement on the side and publishes it with a single pointer store, so
/// a reader never waits on a refresh and never sees a partial delta.
#[derive(Debug)]
pub struct EnrollmentRangeCache {
    schemes: ArcSwap<HashMap<String, SchemeState>>,
    /// Serializes refreshes; readers never take it.
    refresh: Mutex<()>,
}

impl Default for EnrollmentRangeCache {
    fn default() -> Self {
        Self {
            schemes: ArcSwap::from_pointee(HashMap::new()),
            refresh: Mutex::new(()),
        }
    }
}

impl EnrollmentRangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self, protocol: &str) -> Option<Arc<RangeSnapshot>> {
        self.schemes
            .load()
            .get(protocol)
            .map(|state| Arc::clone(&state.active))
    }

    /// Whether `pan` falls in an enrolled range of `protocol`.
    pub fn verify_card(&self, protocol: &str, pan: &str) -> bool {
        let Some(pan) = parse_pan(pan) else {
            return false;
        };
        self.snapshot(protocol)
            .is_some_and(|snapshot| snapshot.contains(pan))
    }

    /// Whether at least one delta has been applied for `protocol`.
    pub fn is_loaded(&self, protocol: &str) -> bool {
        self.schemes
            .load()
            .get(protocol)
            .is_some_and(|state| state.loaded)
    }

    pub fn serial_number(&self, protocol: &str) -> Option<String> {
        self.schemes
            .load()
            .get(protocol)
            .and_then(|state| state.serial_number.clone())
    }

    pub fn range_count(&self, protocol: &str) -> usize {
        self.snapshot(protocol).map_or(0, |snapshot| snapshot.len())
    }

    /// Applies a card range delta all-or-nothing.
    ///
    /// Returns `Ok(false)` when `serial_number` was already applied.
    pub fn apply_delta(
        &self,
        protocol: &str,
        serial_number: &str,
        ranges: &[CardRange],
    ) -> Result<bool, RangeCacheError> {
        let _refresh = self.refresh.lock();

        let schemes = self.schemes.load_full();
        let current = schemes.get(protocol).cloned().unwrap_or_default();
        if current.loaded && current.serial_number.as_deref() == Some(serial_number) {
            debug!(protocol, serial_number, "card range delta already applied");
            return Ok(false);
        }

        let mut begins: BTreeSet<u64> = current.active.begins.iter().copied().collect();
        let mut ends: BTreeSet<u64> = current.active.ends.iter().copied().collect();
        for range in ranges {
            if range.begin > range.end {
                return Err(reject(
                    protocol,
                    format!("range begin {} after end {}", range.begin, range.end),
                ));
            }
            match &range.action {
                RangeAction::Add => {
                    begins.insert(range.begin);
                    ends.insert(range.end);
                }
                RangeAction::Delete => {
                    if !(begins.contains(&range.begin) && ends.contains(&range.end)) {
                        return Err(reject(
                            protocol,
                            format!("delete of absent range {}-{}", range.begin, range.end),
                        ));
                    }
                    begins.remove(&range.begin);
                    ends.remove(&range.end);
                }
                RangeAction::Unrecognized(code) => {
                    return Err(reject(protocol, format!("unrecognized action {code:?}")));
                }
            }
        }
        if begins.len() != ends.len() {
            return Err(reject(
                protocol,
                "range bounds no longer pair up".to_string(),
            ));
        }

        let snapshot = Arc::new(RangeSnapshot::from_sets(begins, ends));
        let count = snapshot.len();
        let mut next = HashMap::clone(&schemes);
        next.insert(
            protocol.to_string(),
            SchemeState {
                serial_number: Some(serial_number.to_string()),
                active: snapshot,
                loaded: true,
            },
        );
        self.schemes.store(Arc::new(next));
        info!(protocol, serial_number, ranges = count, "card ranges refreshed");
        Ok(true)
    }
}

fn reject(protocol: &str, reason: String) -> RangeCacheError {
    warn!(protocol, %reason, "card range delta rejected");
    RangeCacheError::InvalidDelta(reason)
}
