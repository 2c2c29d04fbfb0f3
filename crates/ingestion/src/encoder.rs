//! JsonRecordEncoder - default `RecordEncoder`

use contracts::{ContractError, EncodedEntry, Record, RecordEncoder};
use tracing::debug;

use crate::template::IndexTemplate;
use crate::wire::encode_entry;

/// Renders the index pattern and serializes the record as compact JSON
#[derive(Debug, Clone)]
pub struct JsonRecordEncoder {
    template: IndexTemplate,
}

impl JsonRecordEncoder {
    /// Create from a parsed template
    pub fn new(template: IndexTemplate) -> Self {
        Self { template }
    }

    /// Parse `pattern` and build an encoder
    ///
    /// # Errors
    /// Returns a configuration error for an invalid pattern.
    pub fn from_pattern(pattern: &str) -> Result<Self, ContractError> {
        let template = IndexTemplate::parse(pattern)?;
        debug!(pattern, is_static = template.is_static(), "Index template parsed");
        Ok(Self::new(template))
    }

    /// Index template in use
    pub fn template(&self) -> &IndexTemplate {
        &self.template
    }
}

impl RecordEncoder for JsonRecordEncoder {
    fn encode(&self, record: &Record) -> Result<EncodedEntry, ContractError> {
        let index = self.template.render(record)?;
        encode_entry(&index, record)
    }
}
