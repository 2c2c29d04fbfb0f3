//! Bulk wire format
//!
//! Each entry is two lines:
//! ```text
//! {"index":{"_index":"<name>"}}
//! <compact JSON body>
//! ```

use bytes::{BufMut, BytesMut};
use contracts::{ContractError, EncodedEntry, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize)]
struct ActionHeader<'a> {
    #[serde(borrow)]
    index: IndexAction<'a>,
}

#[derive(Serialize, Deserialize)]
struct IndexAction<'a> {
    #[serde(rename = "_index", borrow)]
    name: std::borrow::Cow<'a, str>,
}

/// Encode one record into a two-line bulk entry
pub fn encode_entry(index: &str, record: &Record) -> Result<EncodedEntry, ContractError> {
    let header = serde_json::to_vec(&ActionHeader {
        index: IndexAction {
            name: index.into(),
        },
    })
    .map_err(|e| ContractError::encode(format!("action header: {e}")))?;
    let body = serde_json::to_vec(record)
        .map_err(|e| ContractError::encode(format!("record body: {e}")))?;

    let mut buf = BytesMut::with_capacity(header.len() + body.len() + 1);
    buf.put_slice(&header);
    buf.put_u8(b'\n');
    buf.put_slice(&body);

    Ok(EncodedEntry::new(index, buf.freeze()))
}

/// Parse one two-line entry back into (index, body)
pub fn decode_entry(wire: &[u8]) -> Result<(String, Value), ContractError> {
    let text = std::str::from_utf8(wire)
        .map_err(|e| ContractError::decode(format!("entry is not utf-8: {e}")))?;
    let (header, body) = text
        .split_once('\n')
        .ok_or_else(|| ContractError::decode("entry has no body line"))?;

    let header: ActionHeader<'_> = serde_json::from_str(header)
        .map_err(|e| ContractError::decode(format!("action header: {e}")))?;
    let body: Value = serde_json::from_str(body.trim_end_matches('\n'))
        .map_err(|e| ContractError::decode(format!("record body: {e}")))?;

    Ok((header.index.name.into_owned(), body))
}

/// Parse a whole bulk payload into (index, body) pairs
pub fn decode_payload(payload: &[u8]) -> Result<Vec<(String, Value)>, ContractError> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| ContractError::decode(format!("payload is not utf-8: {e}")))?;
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() % 2 != 0 {
        return Err(ContractError::decode(format!(
            "payload has {} non-empty lines, expected pairs",
            lines.len()
        )));
    }

    lines
        .chunks_exact(2)
        .map(|pair| decode_entry(format!("{}\n{}", pair[0], pair[1]).as_bytes()))
        .collect()
}
