use crate::core::matcher::DEFAULT_MATCH_CUTOFF;
use crate::core::normalizer::default_stat_scales;
use crate::domain::model::StatScale;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// File-based configuration for scheduled runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub pipeline: PipelineInfo,
    pub feed: FeedConfig,
    pub staging: StagingConfig,
    pub store: StoreConfig,
    pub matcher: Option<MatcherConfig>,
    pub sync: SyncSection,
    /// Per-field rating scales; defaults apply when the table is omitted.
    pub scales: Option<HashMap<String, StatScale>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    pub dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub cutoff: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    pub default_shortlist: String,
    pub managed_shortlists: Vec<String>,
}

impl SyncConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SyncError::Config {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn cutoff(&self) -> f64 {
        self.matcher
            .as_ref()
            .and_then(|m| m.cutoff)
            .unwrap_or(DEFAULT_MATCH_CUTOFF)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("feed.endpoint", &self.feed.endpoint)?;
        validation::validate_path("staging.dir", &self.staging.dir)?;
        validation::validate_path("store.path", &self.store.path)?;
        validation::validate_range("matcher.cutoff", self.cutoff(), 0.0, 1.0)?;
        validation::validate_non_empty_string(
            "sync.default_shortlist",
            &self.sync.default_shortlist,
        )?;

        if let Some(scales) = &self.scales {
            for (field, scale) in scales {
                if scale.upper <= scale.lower {
                    return Err(SyncError::Config {
                        field: format!("scales.{}", field),
                        message: format!(
                            "upper bound {} must exceed lower bound {}",
                            scale.upper, scale.lower
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Substitute `${VAR_NAME}` placeholders from the environment; unset
/// variables are left as-is so validation can flag them.
fn substitute_env_vars(content: &str) -> String {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static pattern");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

impl ConfigProvider for SyncConfig {
    fn feed_endpoint(&self) -> &str {
        &self.feed.endpoint
    }

    fn staging_dir(&self) -> &str {
        &self.staging.dir
    }

    fn store_path(&self) -> &str {
        &self.store.path
    }

    fn match_cutoff(&self) -> f64 {
        self.cutoff()
    }

    fn default_shortlist(&self) -> &str {
        &self.sync.default_shortlist
    }

    fn managed_shortlists(&self) -> &[String] {
        &self.sync.managed_shortlists
    }

    fn stat_scales(&self) -> HashMap<String, StatScale> {
        self.scales.clone().unwrap_or_else(default_stat_scales)
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
