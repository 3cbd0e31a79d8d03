//! Pipeline configuration
//!
//! Every path, column list and locale rule the conversion depends on lives
//! here instead of in the transformation code. All keys are optional in the
//! TOML file; missing keys fall back to the Circular 030 defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::columns::{InputColumn, ReportColumn};
use crate::utils::{DateProfile, NumberProfile};

pub const CONFIG_DIR_NAME: &str = "circular030";
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputProfile,
    pub reference: ReferenceProfile,
    pub constants: ReportConstants,
    pub output: OutputSchema,
    pub row_errors: RowErrorPolicy,
}

/// How the receivables export is read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputProfile {
    pub delimiter: char,
    /// Header overrides keyed by standard column name, for exports that
    /// rename the standard columns
    pub headers: BTreeMap<String, String>,
    /// Plans whose records are excluded from the report
    pub excluded_plans: Vec<String>,
    pub numbers: NumberProfile,
    pub dates: DateProfile,
}

impl Default for InputProfile {
    fn default() -> Self {
        Self {
            delimiter: ',',
            headers: BTreeMap::new(),
            excluded_plans: vec!["ESTATAL".to_string()],
            numbers: NumberProfile::default(),
            dates: DateProfile::default(),
        }
    }
}

impl InputProfile {
    pub fn header(&self, column: InputColumn) -> &str {
        self.headers
            .get(column.default_header())
            .map(String::as_str)
            .unwrap_or_else(|| column.default_header())
    }

    pub fn is_excluded_plan(&self, plan: &str) -> bool {
        let plan = plan.trim();
        self.excluded_plans.iter().any(|p| p == plan)
    }
}

/// How reference legal names are compared with the report's ERP names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Trimmed, otherwise byte-for-byte equality
    #[default]
    Exact,
    /// Case, accents and repeated whitespace are ignored
    Relaxed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceProfile {
    pub path: PathBuf,
    /// Worksheet to read; the first sheet when unset
    pub sheet: Option<String>,
    pub name_column: String,
    pub id_type_column: String,
    /// Delimiter used when the reference is a CSV file
    pub delimiter: char,
    pub match_mode: MatchMode,
}

impl Default for ReferenceProfile {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Base_de_ERP_circular_030.xlsx"),
            sheet: None,
            name_column: "RAZON SOCIAL DE LA ERP".to_string(),
            id_type_column: "TIPO IDENTIFICACION ERP".to_string(),
            delimiter: ',',
            match_mode: MatchMode::Exact,
        }
    }
}

/// Fixed values the regulatory template mandates for this reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConstants {
    pub record_type: i64,
    pub ips_id_type: String,
    pub claim_type: String,
    pub update_indicator: String,
    pub claim_answered: String,
    pub legal_collection: String,
    pub process_stage: i64,
}

impl Default for ReportConstants {
    fn default() -> Self {
        Self {
            record_type: 2,
            ips_id_type: "NI".to_string(),
            claim_type: "F".to_string(),
            update_indicator: String::new(),
            claim_answered: String::new(),
            legal_collection: "No".to_string(),
            process_stage: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSchema {
    pub sheet_name: String,
    pub columns: Vec<ReportColumn>,
    /// Excel number format applied to date cells
    pub date_format: String,
    pub autofit: bool,
}

impl Default for OutputSchema {
    fn default() -> Self {
        Self {
            sheet_name: "Circular 030".to_string(),
            columns: ReportColumn::CANONICAL.to_vec(),
            date_format: "yyyy-mm-dd".to_string(),
            autofit: true,
        }
    }
}

/// What to do with rows whose invoice or amounts cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorPolicy {
    /// Exclude offending rows and report them in the summary
    #[default]
    Skip,
    /// Abort the run on the first offending row
    FailFast,
}

impl PipelineConfig {
    /// Load configuration from an explicit file, or from the user config
    /// directory when it exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => Self::from_file(&default_path),
                _ => {
                    debug!("No configuration file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {:?}", path);
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content).context("Failed to parse TOML")?;
        if let Some(unknown) = config
            .input
            .headers
            .keys()
            .find(|key| !InputColumn::ALL.iter().any(|c| c.default_header() == key.as_str()))
        {
            anyhow::bail!("input.headers: unknown column '{}'", unknown);
        }
        if config.output.columns.is_empty() {
            anyhow::bail!("output.columns must list at least one column");
        }
        for (key, delimiter) in [
            ("input.delimiter", config.input.delimiter),
            ("reference.delimiter", config.reference.delimiter),
        ] {
            if delimiter_byte(delimiter).is_none() {
                anyhow::bail!("{} must be a single ASCII character, got '{}'", key, delimiter);
            }
        }
        Ok(config)
    }
}

/// Delimiter as the single byte the csv reader expects
pub fn delimiter_byte(delimiter: char) -> Option<u8> {
    u8::try_from(delimiter).ok().filter(u8::is_ascii)
}

pub fn default_config_path() -> Option<PathBuf> {
    dir_spec::config_home().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILENAME))
}
