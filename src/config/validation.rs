//! Configuration validation for inventory-enrich.
//!
//! Provides the `Validatable` trait and implementations for every config section.

use super::types::*;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn check_ratio(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::new(
            field,
            format!("Ratio must be between 0.0 and 1.0, got {value}"),
        ));
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.classification.validate());
        errors.extend(self.discovery.validate());
        errors.extend(self.baselines.validate());
        errors
    }
}

impl Validatable for ClassificationConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_ratio(&mut errors, "classification.high_ratio", self.high_ratio);
        check_ratio(&mut errors, "classification.medium_ratio", self.medium_ratio);

        if let Some(ref rules_file) = self.rules_file {
            if !rules_file.exists() {
                errors.push(ConfigError::new(
                    "classification.rules_file",
                    format!("Rules file not found: {}", rules_file.display()),
                ));
            }
        } else if !self.include_default_rules {
            errors.push(ConfigError::new(
                "classification.include_default_rules",
                "Default rules disabled but no rules_file given; no rule would ever fire",
            ));
        }

        errors
    }
}

impl Validatable for DiscoveryConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        check_ratio(&mut errors, "discovery.high_ratio", self.high_ratio);
        check_ratio(&mut errors, "discovery.medium_ratio", self.medium_ratio);

        if self.max_candidates == 0 {
            errors.push(ConfigError::new(
                "discovery.max_candidates",
                "Max candidates must be at least 1",
            ));
        }

        errors
    }
}

impl Validatable for BaselineConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.index_url.is_some() && self.directory.is_some() {
            errors.push(ConfigError::new(
                "baselines",
                "Only one of 'index_url' and 'directory' may be set",
            ));
        }

        if let Some(ref url) = self.index_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ConfigError::new(
                    "baselines.index_url",
                    format!("Expected an http(s) URL, got '{url}'"),
                ));
            }
        }

        if self.timeout_secs == 0 {
            errors.push(ConfigError::new(
                "baselines.timeout_secs",
                "Timeout must be at least 1 second",
            ));
        }

        errors
    }
}

// ============================================================================
// Tests
// ============================================================================
