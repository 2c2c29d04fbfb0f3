//! IndexTemplate - destination index name from a record
//!
//! Pattern syntax:
//! - literal text is copied as-is
//! - `%{field}` / `%{a.b.c}` inserts a scalar field (nested via dots)
//! - `%{+<strftime>}` inserts the current UTC time, e.g. `%{+%Y.%m.%d}`

use std::fmt::{self, Write};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use contracts::Record;
use serde_json::Value;

use crate::error::{IngestionError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Vec<String>),
    Date(String),
}

/// Parsed index pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl IndexTemplate {
    /// Parse a pattern
    ///
    /// # Errors
    /// Unterminated or empty placeholders and invalid date formats.
    pub fn parse(pattern: &str) -> Result<Self> {
        let invalid = |message: &str| IngestionError::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.to_string(),
        };

        let mut segments = Vec::new();
        let mut rest = pattern;

        while let Some(start) = rest.find("%{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| invalid("unterminated '%{'"))?;
            let inner = after[..end].trim();

            if let Some(format) = inner.strip_prefix('+') {
                if format.is_empty() {
                    return Err(invalid("empty date format"));
                }
                if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                    return Err(invalid("bad date format"));
                }
                segments.push(Segment::Date(format.to_string()));
            } else {
                let path: Vec<String> = inner.split('.').map(str::to_string).collect();
                if path.iter().any(|p| p.is_empty()) {
                    return Err(invalid("empty field name"));
                }
                segments.push(Segment::Field(path));
            }

            rest = &after[end + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        if segments.is_empty() {
            return Err(invalid("pattern is empty"));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// Original pattern text
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True if the pattern has no placeholders
    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Render against a record using the current time
    pub fn render(&self, record: &Record) -> Result<String> {
        self.render_at(record, Utc::now())
    }

    /// Render against a record at a fixed time
    pub fn render_at(&self, record: &Record, now: DateTime<Utc>) -> Result<String> {
        let mut out = String::with_capacity(self.pattern.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(path) => out.push_str(&lookup(record, path)?),
                Segment::Date(format) => write!(out, "{}", now.format(format)).map_err(
                    |_: fmt::Error| IngestionError::DateFormat {
                        format: format.clone(),
                    },
                )?,
            }
        }
        Ok(out)
    }
}

fn lookup(record: &Record, path: &[String]) -> Result<String> {
    let dotted = || path.join(".");
    let (first, tail) = path.split_first().ok_or_else(|| IngestionError::MissingField {
        field: String::new(),
    })?;

    let mut value = record
        .get(first)
        .ok_or_else(|| IngestionError::MissingField { field: dotted() })?;
    for key in tail {
        value = value
            .get(key)
            .ok_or_else(|| IngestionError::MissingField { field: dotted() })?;
    }

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            Err(IngestionError::NonScalarField { field: dotted() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_static_pattern() {
        let tpl = IndexTemplate::parse("nginx").unwrap();
        assert!(tpl.is_static());
        assert_eq!(tpl.render(&Record::new()).unwrap(), "nginx");
    }

    #[test]
    fn test_field_and_nested_field() {
        let tpl = IndexTemplate::parse("%{app}-%{meta.env}-%{shard}").unwrap();
        let rec = record(json!({"app": "web", "meta": {"env": "prod"}, "shard": 3}));
        assert_eq!(tpl.render(&rec).unwrap(), "web-prod-3");
    }

    #[test]
    fn test_date_placeholder() {
        let tpl = IndexTemplate::parse("logs-%{+%Y.%m.%d}").unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(tpl.render_at(&Record::new(), now).unwrap(), "logs-2024.03.09");
    }

    #[test]
    fn test_missing_field() {
        let tpl = IndexTemplate::parse("logs-%{service.name}").unwrap();
        let rec = record(json!({"service": {}}));
        let err = tpl.render(&rec).unwrap_err();
        assert!(matches!(err, IngestionError::MissingField { ref field } if field == "service.name"));
    }

    #[test]
    fn test_non_scalar_field() {
        let tpl = IndexTemplate::parse("%{tags}").unwrap();
        let rec = record(json!({"tags": ["a", "b"]}));
        assert!(matches!(
            tpl.render(&rec),
            Err(IngestionError::NonScalarField { .. })
        ));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(IndexTemplate::parse("logs-%{host").is_err());
        assert!(IndexTemplate::parse("logs-%{}").is_err());
        assert!(IndexTemplate::parse("logs-%{+}").is_err());
        assert!(IndexTemplate::parse("").is_err());
    }
}
