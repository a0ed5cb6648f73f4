use crate::rules::RuleSpec;
use crate::scan::{ScanOptions, DEFAULT_EXTENSION, VENDORED_DIR};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    /// Directory to migrate; the CLI flag wins when both are given.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub backup: bool,
    #[serde(default)]
    pub scan: ScanSection,
    /// Extra rules, applied after the built-in table in file order.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl MigrationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let extension = self.scan.extension.trim();
        if extension.is_empty() {
            issues.push(ValidationIssue::MissingField {
                rule: None,
                field: "scan.extension",
            });
        } else if extension.starts_with('.') {
            issues.push(ValidationIssue::InvalidValue {
                rule: None,
                message: format!("scan.extension '{extension}' must not start with '.'"),
            });
        }

        if self.scan.exclude.iter().any(|dir| dir.trim().is_empty()) {
            issues.push(ValidationIssue::InvalidValue {
                rule: None,
                message: "scan.exclude contains an empty folder name".to_string(),
            });
        }

        // Field presence only. Patterns and name clashes are checked when
        // the rules are compiled into a `RuleTable`.
        for rule in &self.rules {
            let name = rule.name.trim();
            if name.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule: None,
                    field: "name",
                });
                continue;
            }
            if rule.pattern.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule: Some(name.to_string()),
                    field: "pattern",
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            extension: self.scan.extension.trim().to_string(),
            excluded_dirs: self.scan.exclude.clone(),
        }
    }

    pub fn rule_specs(&self) -> Vec<RuleSpec> {
        self.rules
            .iter()
            .map(|rule| RuleSpec::new(rule.name.trim(), &rule.pattern, &rule.replacement))
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScanSection {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            exclude: default_exclude(),
        }
    }
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_exclude() -> Vec<String> {
    vec![VENDORED_DIR.to_string()]
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    pub name: String,
    pub pattern: String,
    /// May reference capture groups as `$1` or `${name}`.
    #[serde(default)]
    pub replacement: String,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField {
        rule: Option<String>,
        field: &'static str,
    },
    InvalidValue {
        rule: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { rule, field } => match rule {
                Some(name) => write!(f, "rule '{name}' missing required field '{field}'"),
                None => write!(f, "missing required field '{field}'"),
            },
            ValidationIssue::InvalidValue { rule, message } => match rule {
                Some(name) => write!(f, "rule '{name}' has invalid configuration: {message}"),
                None => write!(f, "invalid migration configuration: {message}"),
            },
        }
    }
}
