//! Parser for data quality rule catalogs (YAML/TOML formats).
//!
//! This module parses declarative rule catalogs from YAML and TOML files
//! into the strongly-typed `CatalogDefinition` structure.
//!
//! # Example
//!
//! ```rust
//! use quality_parser::parse_yaml;
//!
//! let yaml = r#"
//! name: silver_checks
//! layer: silver
//! rules:
//!   - name: cst_key_whitespace
//!     table: crm_cust_info
//!     keys: [cst_id]
//!     check:
//!       type: trimmed
//!       column: cst_key
//! "#;
//!
//! let catalog = parse_yaml(yaml).expect("Failed to parse catalog");
//! assert_eq!(catalog.rules.len(), 1);
//! ```

use quality_core::CatalogDefinition;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during catalog parsing.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported catalog file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
}

/// Parse a catalog from a YAML string.
pub fn parse_yaml(content: &str) -> Result<CatalogDefinition> {
    let catalog: CatalogDefinition = serde_yaml_ng::from_str(content)?;
    Ok(catalog)
}

/// Parse a catalog from a TOML string.
///
/// Dates may be bare TOML dates (`as_of = 2024-06-30`) or quoted strings.
///
/// # Example
///
/// ```rust
/// use quality_parser::parse_toml;
///
/// let toml = r#"
/// name = "sales_checks"
///
/// [[rules]]
/// name = "sls_sales_consistency"
/// table = "crm_sales_details"
///
/// [rules.check]
/// type = "sales_consistency"
/// "#;
///
/// let catalog = parse_toml(toml).unwrap();
/// assert_eq!(catalog.rules[0].check.type_name(), "sales_consistency");
/// ```
pub fn parse_toml(content: &str) -> Result<CatalogDefinition> {
    let mut table: toml::Table = content
        .parse()
        .map_err(|e: toml::de::Error| ParserError::TomlError(e.to_string()))?;
    table.iter_mut().for_each(|(_, v)| dates_to_strings(v));

    toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ParserError::TomlError(e.to_string()))
}

/// Rewrites TOML date literals as strings, the form catalog dates
/// deserialize from.
fn dates_to_strings(value: &mut toml::Value) {
    match value {
        toml::Value::Datetime(datetime) => {
            let text = datetime.to_string();
            *value = toml::Value::String(text);
        }
        toml::Value::Array(items) => items.iter_mut().for_each(dates_to_strings),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| dates_to_strings(v)),
        _ => {}
    }
}

/// Detect the catalog format from a file path based on its extension.
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<CatalogFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(CatalogFormat::Yaml),
        "toml" => Ok(CatalogFormat::Toml),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a catalog from a file with automatic format detection.
///
/// # Example
///
/// ```no_run
/// use quality_parser::parse_file;
/// use std::path::Path;
///
/// let catalog = parse_file(Path::new("catalogs/silver.yml")).unwrap();
/// println!("Loaded catalog: {}", catalog.name);
/// ```
pub fn parse_file(path: &Path) -> Result<CatalogDefinition> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        CatalogFormat::Yaml => parse_yaml(&content),
        CatalogFormat::Toml => parse_toml(&content),
    }
}
