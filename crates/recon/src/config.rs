use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Optional run configuration. Every field has a default, so an empty TOML
/// document (or no config at all) means "infer everything".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source: DatasetConfig,
    #[serde(default)]
    pub target: DatasetConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Dataset overrides
// ---------------------------------------------------------------------------

/// Per-dataset overrides for the inferred header row and columns.
///
/// Forced column names are used verbatim, even if the header lacks them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    #[serde(default)]
    pub header_row: Option<usize>,
    #[serde(default)]
    pub id_column: Option<String>,
    #[serde(default)]
    pub amount_column: Option<String>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// File stem for matched records.
    #[serde(default = "default_matched")]
    pub matched: String,
    /// File stem for unmatched records.
    #[serde(default = "default_unmatched")]
    pub unmatched: String,
}

fn default_matched() -> String {
    "matched".into()
}

fn default_unmatched() -> String {
    "unmatched".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            matched: default_matched(),
            unmatched: default_unmatched(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing + validation
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(s: &str) -> Result<Self, ReconError> {
        let config: Self = toml::from_str(s).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        for (role, ds) in [("source", &self.source), ("target", &self.target)] {
            if ds.id_column.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{role}.id_column must not be empty"
                )));
            }
            if ds.amount_column.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(ReconError::ConfigValidation(format!(
                    "{role}.amount_column must not be empty"
                )));
            }
        }

        if self.target.amount_column.is_some() {
            return Err(ReconError::ConfigValidation(
                "target.amount_column is not supported: target amounts are read from its \"Amt\" column".into(),
            ));
        }

        if self.output.matched.trim().is_empty() || self.output.unmatched.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "output.matched and output.unmatched must not be empty".into(),
            ));
        }
        if self.output.matched == self.output.unmatched {
            return Err(ReconError::ConfigValidation(format!(
                "output.matched and output.unmatched both name '{}'",
                self.output.matched
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = ReconConfig::from_toml("").unwrap();
        assert!(config.name.is_none());
        assert!(config.source.header_row.is_none());
        assert_eq!(config.output.format, OutputFormat::Xlsx);
        assert_eq!(config.output.matched, "matched");
        assert_eq!(config.output.unmatched, "unmatched");
    }

    #[test]
    fn parses_overrides() {
        let config = ReconConfig::from_toml(
            r#"
name = "March remittance"

[source]
header_row = 3
id_column = "Bill No"
amount_column = "Paid"

[target]
id_column = "Claim Number"

[output]
format = "csv"
matched = "paid"
"#,
        )
        .unwrap();
        assert_eq!(config.name.as_deref(), Some("March remittance"));
        assert_eq!(config.source.header_row, Some(3));
        assert_eq!(config.source.id_column.as_deref(), Some("Bill No"));
        assert_eq!(config.source.amount_column.as_deref(), Some("Paid"));
        assert_eq!(config.target.id_column.as_deref(), Some("Claim Number"));
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.output.matched, "paid");
        assert_eq!(config.output.unmatched, "unmatched");
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = ReconConfig::from_toml("[source]\nheader = 2\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }

    #[test]
    fn rejects_target_amount_column() {
        let err = ReconConfig::from_toml("[target]\namount_column = \"Amt\"\n").unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }

    #[test]
    fn rejects_blank_column_names() {
        let err = ReconConfig::from_toml("[source]\nid_column = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("source.id_column"));
    }

    #[test]
    fn rejects_colliding_output_stems() {
        let err = ReconConfig::from_toml("[output]\nmatched = \"out\"\nunmatched = \"out\"\n")
            .unwrap_err();
        assert!(matches!(err, ReconError::ConfigValidation(_)));
    }
}
