//! RecordEncoder trait - turns a record into a bulk entry

use crate::{ContractError, EncodedEntry, Record};

/// Computes the destination name of a record and serializes it
pub trait RecordEncoder: Send + Sync {
    /// Encode one record
    ///
    /// # Errors
    /// Returns an encode error if the destination name or the body
    /// cannot be produced; the caller drops the record.
    fn encode(&self, record: &Record) -> Result<EncodedEntry, ContractError>;
}

impl<F> RecordEncoder for F
where
    F: Fn(&Record) -> Result<EncodedEntry, ContractError> + Send + Sync,
{
    fn encode(&self, record: &Record) -> Result<EncodedEntry, ContractError> {
        self(record)
    }
}
