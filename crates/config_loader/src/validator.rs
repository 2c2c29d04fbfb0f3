//! Config validation
//!
//! Rules:
//! - at least one address, each non-empty and http(s)
//! - username / password / index non-empty
//! - batch_size, batch_flush_interval, concurrency, request_timeout,
//!   queue_capacity_factor > 0

use contracts::{ContractError, OutputConfig};
use ::validator::Validate;

/// Validate an OutputConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &OutputConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_addresses(config)?;
    Ok(())
}

/// Field-level rules declared on `OutputConfig`
fn validate_fields(config: &OutputConfig) -> Result<(), ContractError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    match fields.first() {
        Some((field, field_errors)) => {
            let message = field_errors
                .first()
                .and_then(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid value".to_string());
            Err(ContractError::config_validation(field.to_string(), message))
        }
        None => Err(ContractError::config_validation("<config>", errors.to_string())),
    }
}

/// Every address must be a usable http(s) base URL
fn validate_addresses(config: &OutputConfig) -> Result<(), ContractError> {
    for (idx, address) in config.addresses.iter().enumerate() {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(ContractError::config_validation(
                format!("addresses[{idx}]"),
                "address cannot be empty",
            ));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ContractError::config_validation(
                format!("addresses[{idx}]"),
                format!("address '{address}' must start with http:// or https://"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> OutputConfig {
        OutputConfig::new(
            vec!["http://127.0.0.1:4080".into()],
            "admin",
            "pw",
            "logs-%{host}",
        )
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&minimal_config()).is_ok());
    }

    #[test]
    fn test_no_addresses() {
        let mut cfg = minimal_config();
        cfg.addresses.clear();
        let err = validate(&cfg).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("addresses"), "got: {err}");
    }

    #[test]
    fn test_zero_batch_size() {
        let mut cfg = minimal_config();
        cfg.batch_size = 0;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("batch_size must be > 0"), "got: {err}");
    }

    #[test]
    fn test_zero_concurrency() {
        let mut cfg = minimal_config();
        cfg.concurrency = 0;
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("concurrency"), "got: {err}");
    }

    #[test]
    fn test_empty_username() {
        let mut cfg = minimal_config();
        cfg.username = String::new();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("username cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_blank_address() {
        let mut cfg = minimal_config();
        cfg.addresses.push("   ".into());
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("addresses[1]"), "got: {err}");
    }

    #[test]
    fn test_address_without_scheme() {
        let mut cfg = minimal_config();
        cfg.addresses = vec!["127.0.0.1:4080".into()];
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("http://"), "got: {err}");
    }
}
