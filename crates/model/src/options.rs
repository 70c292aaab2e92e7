use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Knobs shared by the parser, the checker and select resolution.
///
/// Every field has a default so a partial JSON document is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Keep unknown function names as custom-function nodes instead of failing.
    pub accept_custom_funcs: bool,
    /// Qualify every wildcard-expanded column with its table alias.
    pub always_prefix_with_table_name: bool,
    pub allow_fields_in_secondary_tables_in_where: bool,
    pub allow_mismatched_comparison_types: bool,
    /// `_` in LIKE matches a character rather than a byte.
    pub utf8_strings: bool,
    /// Quote character used when unparsing identifiers.
    pub column_quote: char,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            accept_custom_funcs: false,
            always_prefix_with_table_name: false,
            allow_fields_in_secondary_tables_in_where: false,
            allow_mismatched_comparison_types: false,
            utf8_strings: true,
            column_quote: '"',
        }
    }
}

impl ParseOptions {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }
}
