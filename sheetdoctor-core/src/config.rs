//! Configuration system for the validator

use crate::error::{Error, Result};
use crate::problem::ProblemKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Validator configuration, usually loaded from `sheetdoctor.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Problem codes or code prefixes to leave out of the report
    #[serde(default)]
    pub disabled_checks: HashSet<String>,
    /// Resolve relationship parts of individual worksheets
    #[serde(default = "default_true")]
    pub worksheet_relationships: bool,
    /// Scan worksheets for empty formula elements
    #[serde(default = "default_true")]
    pub formulas: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            disabled_checks: HashSet::new(),
            worksheet_relationships: true,
            formulas: true,
        }
    }
}

impl ValidatorConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check if problems with this code should be reported
    pub fn is_check_enabled(&self, code: &str) -> bool {
        !self
            .disabled_checks
            .iter()
            .any(|selector| matches_check_selector(selector, code))
    }

    /// Reject selectors that match no known problem code
    pub fn validate_checks(&self) -> Result<()> {
        let valid = valid_selectors();
        for selector in &self.disabled_checks {
            if selector == "ALL" {
                return Err(Error::InvalidConfig(
                    "'ALL' is not allowed in disabled_checks".to_string(),
                ));
            }
            if !valid.contains(selector.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "Unknown check or category '{}' in disabled_checks",
                    selector
                )));
            }
        }
        Ok(())
    }
}

/// Every problem code plus its category prefix ("REL003", "REL", ...)
fn valid_selectors() -> HashSet<&'static str> {
    let mut selectors = HashSet::new();
    for kind in ProblemKind::ALL {
        let code = kind.code();
        selectors.insert(code);
        selectors.insert(code.trim_end_matches(|c: char| c.is_ascii_digit()));
    }
    selectors
}

fn matches_check_selector(selector: &str, code: &str) -> bool {
    code == selector || code.starts_with(selector)
}
