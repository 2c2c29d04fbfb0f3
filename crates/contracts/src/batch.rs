//! Record, EncodedEntry, Batch - the units flowing through the engine
//!
//! `Record -> EncodedEntry -> Batch -> DispatchMessage`

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::{Map, Value};

/// One structured input record (field name -> value)
pub type Record = Map<String, Value>;

/// Serialized form of one record plus its destination name
///
/// `wire` holds the two-line bulk entry (action header + body) without a
/// trailing newline. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEntry {
    index: String,
    wire: Bytes,
}

impl EncodedEntry {
    /// Wrap an already-encoded bulk entry
    pub fn new(index: impl Into<String>, wire: impl Into<Bytes>) -> Self {
        Self {
            index: index.into(),
            wire: wire.into(),
        }
    }

    /// Destination index name
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Encoded two-line entry
    pub fn wire(&self) -> &Bytes {
        &self.wire
    }
}

/// Ordered, non-empty group of entries for one outbound bulk call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    entries: Vec<EncodedEntry>,
}

impl Batch {
    /// Build a batch; returns `None` for an empty entry list
    pub fn from_entries(entries: Vec<EncodedEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// Number of entries (always >= 1)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in arrival order
    pub fn entries(&self) -> &[EncodedEntry] {
        &self.entries
    }

    /// Consume into entries
    pub fn into_entries(self) -> Vec<EncodedEntry> {
        self.entries
    }

    /// Line-delimited bulk body: entries joined by `\n`, with a trailing `\n`
    pub fn to_bulk_payload(&self) -> Bytes {
        let size: usize = self.entries.iter().map(|e| e.wire.len() + 1).sum();
        let mut buf = BytesMut::with_capacity(size);
        for entry in &self.entries {
            buf.put_slice(&entry.wire);
            buf.put_u8(b'\n');
        }
        buf.freeze()
    }
}

/// Item carried on the dispatch channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchMessage {
    /// A batch to deliver
    Data(Batch),
    /// Stop exactly one worker
    Terminate,
}
