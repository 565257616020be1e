use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid noise pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Acceptance bounds applied to every candidate line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemLimits {
    pub max_name_chars: usize,
    /// Anti-garbage ceiling for OCR digit insertions, not a business rule.
    pub max_unit_price: Decimal,
    pub max_total_price: Decimal,
    /// Absolute floor of the price consistency tolerance (rounding).
    pub min_abs_tolerance: Decimal,
    /// Relative part of the tolerance (one misread digit).
    pub rel_tolerance: Decimal,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self {
            max_name_chars: 100,
            max_unit_price: Decimal::from(10_000),
            max_total_price: Decimal::from(100_000),
            min_abs_tolerance: Decimal::new(1, 2),
            rel_tolerance: Decimal::new(5, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Passed to the recognition backend on every call.
    pub language_hint: String,
    /// A first pass scoring below this triggers the single retry.
    pub retry_below_confidence: f32,
    /// Results scoring below this are flagged for review.
    pub review_below_confidence: f32,
    /// Exclusive upper bound for a declared total to be believed.
    pub max_declared_total: Decimal,
    /// Additional case-insensitive regexes marking lines as noise.
    pub extra_noise_patterns: Vec<String>,
    pub limits: ItemLimits,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            language_hint: "chi_sim+eng".to_string(),
            retry_below_confidence: 60.0,
            review_below_confidence: 70.0,
            max_declared_total: Decimal::from(100_000),
            extra_noise_patterns: Vec::new(),
            limits: ItemLimits::default(),
        }
    }
}

impl ParserConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ParserConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.limits;
        if l.max_name_chars == 0 {
            return Err(ConfigError::Invalid("limits.max_name_chars must be at least 1".into()));
        }
        if l.max_unit_price <= Decimal::ZERO || l.max_total_price <= Decimal::ZERO {
            return Err(ConfigError::Invalid("price ceilings must be positive".into()));
        }
        if l.min_abs_tolerance < Decimal::ZERO {
            return Err(ConfigError::Invalid("limits.min_abs_tolerance must not be negative".into()));
        }
        if l.rel_tolerance < Decimal::ZERO || l.rel_tolerance >= Decimal::ONE {
            return Err(ConfigError::Invalid("limits.rel_tolerance must be in [0, 1)".into()));
        }
        if self.max_declared_total <= Decimal::ZERO {
            return Err(ConfigError::Invalid("max_declared_total must be positive".into()));
        }
        for (name, value) in [
            ("retry_below_confidence", self.retry_below_confidence),
            ("review_below_confidence", self.review_below_confidence),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be in [0, 100], got {value}")));
            }
        }
        if self.language_hint.trim().is_empty() {
            return Err(ConfigError::Invalid("language_hint must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let c = ParserConfig::default();
        c.validate().unwrap();
        assert_eq!(c.retry_below_confidence, 60.0);
        assert_eq!(c.limits.max_unit_price, Decimal::from(10_000));
        assert_eq!(c.limits.rel_tolerance, Decimal::new(5, 2));
    }

    #[test]
    fn empty_toml_yields_defaults() {
        assert_eq!(ParserConfig::from_toml("").unwrap(), ParserConfig::default());
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let c = ParserConfig::from_toml(
            r#"
            language_hint = "eng"
            extra_noise_patterns = ["^vat no"]

            [limits]
            max_unit_price = "500"
            "#,
        )
        .unwrap();
        assert_eq!(c.language_hint, "eng");
        assert_eq!(c.extra_noise_patterns, vec!["^vat no".to_string()]);
        assert_eq!(c.limits.max_unit_price, Decimal::from(500));
        assert_eq!(c.limits.max_total_price, Decimal::from(100_000));
        assert_eq!(c.retry_below_confidence, 60.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            ParserConfig::from_toml("retry_below_confidence = 140.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_toml("[limits]\nrel_tolerance = \"1.5\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ParserConfig::from_toml("max_declared_total = \"0\""),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(ParserConfig::from_toml("language_hint = "), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "review_below_confidence = 85.0").unwrap();
        let c = ParserConfig::load(file.path()).unwrap();
        assert_eq!(c.review_below_confidence, 85.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ParserConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
