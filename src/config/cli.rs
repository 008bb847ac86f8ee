use crate::core::normalizer::default_stat_scales;
use crate::domain::model::StatScale;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::collections::HashMap;

#[derive(Debug, Clone, Parser)]
#[command(name = "scout-sync")]
#[command(about = "Reconcile external scouting feeds into the master player store")]
pub struct CliConfig {
    /// Open-data CSV endpoint to acquire from.
    #[arg(long, default_value = "https://raw.githubusercontent.com/lcjmo-mock/football-data/master/latest_transfer_updates.csv")]
    pub feed_endpoint: String,

    /// Directory for staged feed snapshots.
    #[arg(long, default_value = "./staging")]
    pub staging_dir: String,

    /// Path of the JSON master store.
    #[arg(long, default_value = "./data/master_db.json")]
    pub store_path: String,

    /// TOML config file; when set it supplies the pipeline settings and
    /// the flags above are ignored.
    #[arg(long)]
    pub config: Option<String>,

    /// Similarity cutoff for fuzzy name matching.
    #[arg(long, default_value = "0.85")]
    pub match_cutoff: f64,

    /// Shortlist used when a shortlisted record declares none.
    #[arg(long, default_value = "Global Scouting Targets")]
    pub default_shortlist: String,

    /// Shortlists the pipeline is allowed to rewrite.
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "Global Scouting Targets,Ajax First Team"
    )]
    pub managed_shortlists: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs (for scheduled runs)")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn feed_endpoint(&self) -> &str {
        &self.feed_endpoint
    }

    fn staging_dir(&self) -> &str {
        &self.staging_dir
    }

    fn store_path(&self) -> &str {
        &self.store_path
    }

    fn match_cutoff(&self) -> f64 {
        self.match_cutoff
    }

    fn default_shortlist(&self) -> &str {
        &self.default_shortlist
    }

    fn managed_shortlists(&self) -> &[String] {
        &self.managed_shortlists
    }

    fn stat_scales(&self) -> HashMap<String, StatScale> {
        default_stat_scales()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("feed_endpoint", &self.feed_endpoint)?;
        validation::validate_path("staging_dir", &self.staging_dir)?;
        validation::validate_path("store_path", &self.store_path)?;
        validation::validate_range("match_cutoff", self.match_cutoff, 0.0, 1.0)?;
        validation::validate_non_empty_string("default_shortlist", &self.default_shortlist)?;
        Ok(())
    }
}
