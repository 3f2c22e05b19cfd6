use crate::domain::card_range::CardRange;
use crate::error::{MpiError, Result};
use std::io::Read;

/// Card range deltas from a `begin,end,action` CSV file, the offline
/// counterpart of a directory `CRRes`. Cells may be padded with spaces.
pub struct CardRangeReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CardRangeReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes ranges.
    pub fn ranges(self) -> impl Iterator<Item = Result<CardRange>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(MpiError::from))
    }

    /// Reads every row, failing on the first bad one so that a delta is
    /// never applied partially.
    pub fn read_all(self) -> Result<Vec<CardRange>> {
        self.ranges().collect()
    }
}
