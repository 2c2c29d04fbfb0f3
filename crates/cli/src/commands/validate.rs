//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::OutputConfig;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    address_count: usize,
    index: String,
    batch_size: usize,
    concurrency: usize,
    queue_capacity: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    address_count: config.addresses.len(),
                    index: config.index.clone(),
                    batch_size: config.batch_size,
                    concurrency: config.concurrency,
                    queue_capacity: config.queue_capacity(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &OutputConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.addresses.iter().any(|a| a.starts_with("http://")) {
        warnings.push("Plain http:// address - credentials are sent unencrypted".to_string());
    }

    let mut seen = std::collections::HashSet::new();
    for address in &config.addresses {
        if !seen.insert(address.trim_end_matches('/')) {
            warnings.push(format!("Duplicate address '{}' - it will be picked more often", address));
        }
    }

    if config.batch_size == 1 {
        warnings.push("batch_size = 1 - every record becomes its own bulk call".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Addresses: {}", summary.address_count);
            println!("  Index: {}", summary.index);
            println!("  Batch size: {}", summary.batch_size);
            println!("  Workers: {}", summary.concurrency);
            println!("  Queue capacity: {}", summary.queue_capacity);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_valid_config_with_warnings() {
        let file = write_config(
            r#"
addresses = ["http://a:4080", "http://a:4080/"]
username = "admin"
password = "pw"
index = "logs"
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: true,
        });
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("Plain http")));
        assert!(warnings.iter().any(|w| w.contains("Duplicate")));
        assert_eq!(result.summary.unwrap().queue_capacity, 12);
    }

    #[test]
    fn test_invalid_config_reports_error() {
        let file = write_config(
            r#"
addresses = []
username = "admin"
password = "pw"
index = "logs"
"#,
        );
        let result = validate_config(&ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        });
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("addresses"));
    }
}
