//! Chart labels used when assembling comparisons.
//!
//! Every field has a default, so an empty TOML document (or `Default::default()`)
//! reproduces the stock chart titles. Unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparatorConfig {
    /// Shared x-axis title.
    pub x_axis_title: String,
    pub raw_title: String,
    pub raw_y_axis_title: String,
    pub dca_title: String,
    pub dca_y_axis_title: String,
    /// Name of the uninvested-cash reference trace.
    pub uninvested_cash_name: String,
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        ComparatorConfig {
            x_axis_title: "Date".into(),
            raw_title: "Stock comparison".into(),
            raw_y_axis_title: "Share value".into(),
            dca_title: "DCA comparison".into(),
            dca_y_axis_title: "Wallet value".into(),
            uninvested_cash_name: "Uninvested cash".into(),
        }
    }
}

impl ComparatorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
