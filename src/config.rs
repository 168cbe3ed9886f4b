use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::models::DecisionType;

/// Root configuration structure, deserialized from `.report-importr/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Import switches.
    #[serde(default)]
    pub import: ImportConfig,
}

/// Controls which parts of a report are written and how.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Run the license import. Once it runs, the licenses found in each file
    /// are always recorded as findings.
    #[serde(default = "default_true")]
    pub create_license_infos_as_findings: bool,
    /// Also record the concluded licenses as findings.
    #[serde(default)]
    pub create_concluded_licenses_as_findings: bool,
    /// Turn the concluded licenses into one clearing decision per file.
    #[serde(default = "default_true")]
    pub create_concluded_licenses_as_conclusions: bool,
    /// Import copyright statements.
    #[serde(default)]
    pub add_copyright_information: bool,
    /// Unknown licenses proposed by the report become candidates instead of
    /// final taxonomy entries.
    #[serde(default = "default_true")]
    pub create_licenses_as_candidate: bool,
    /// Decision type stamped on synthesized decisions.
    #[serde(default = "default_decision_type")]
    pub conclude_license_decision_type: DecisionType,
}

fn default_true() -> bool {
    true
}

fn default_decision_type() -> DecisionType {
    DecisionType::Identified
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            create_license_infos_as_findings: true,
            create_concluded_licenses_as_findings: false,
            create_concluded_licenses_as_conclusions: true,
            add_copyright_information: false,
            create_licenses_as_candidate: true,
            conclude_license_decision_type: DecisionType::Identified,
        }
    }
}

impl ImportConfig {
    /// Whether any license-related output is enabled.
    pub fn wants_licenses(&self) -> bool {
        self.create_license_infos_as_findings
            || self.create_concluded_licenses_as_findings
            || self.create_concluded_licenses_as_conclusions
    }
}

/// Load the import configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<work_dir>/.report-importr/config.toml`
/// 3. `~/.config/report-importr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(work_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let local_config = work_dir.join(".report-importr").join("config.toml");
    if local_config.exists() {
        return read_config(&local_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("report-importr")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}
