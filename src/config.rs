use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG: &str = "miso.toml";

/// Top-level MISO configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MisoConfig {
    /// Forecast schedule and ensemble.
    #[serde(default)]
    pub run: RunToml,

    /// EEOF operator settings.
    #[serde(default)]
    pub eeof: EeofToml,

    /// Spatial boxes.
    #[serde(default)]
    pub region: RegionToml,

    /// Input and output locations.
    #[serde(default)]
    pub paths: PathsToml,

    /// NetCDF variable names.
    #[serde(default)]
    pub variables: VariablesToml,

    /// Undefined-value policy.
    #[serde(default)]
    pub validation: ValidationToml,

    /// File open retry.
    #[serde(default)]
    pub retry: RetryToml,
}

impl MisoConfig {
    /// Loads the configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG`] is read
    /// if present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG);
                if !default.exists() {
                    info!("no {DEFAULT_CONFIG} found, using built-in defaults");
                    return Ok(Self::default());
                }
                default
            }
        };
        let toml_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: MisoConfig = toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunToml {
    #[serde(default = "default_members")]
    pub members: Vec<String>,
    #[serde(default = "default_n_initializations")]
    pub n_initializations: usize,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: usize,
    #[serde(default = "default_model_tag")]
    pub model_tag: String,
}

impl Default for RunToml {
    fn default() -> Self {
        Self {
            members: default_members(),
            n_initializations: default_n_initializations(),
            forecast_days: default_forecast_days(),
            model_tag: default_model_tag(),
        }
    }
}

fn default_members() -> Vec<String> {
    (1..=4).map(|i| format!("mem{i}")).collect()
}
fn default_n_initializations() -> usize {
    4
}
fn default_forecast_days() -> usize {
    32
}
fn default_model_tag() -> String {
    "CNCUM".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EeofToml {
    #[serde(default = "default_tau")]
    pub tau: i64,
    #[serde(default = "default_embedding")]
    pub embedding: usize,
    #[serde(default = "default_alignment")]
    pub alignment: String,
}

impl Default for EeofToml {
    fn default() -> Self {
        Self {
            tau: default_tau(),
            embedding: default_embedding(),
            alignment: default_alignment(),
        }
    }
}

fn default_tau() -> i64 {
    1
}
fn default_embedding() -> usize {
    15
}
fn default_alignment() -> String {
    "nearest".to_string()
}

/// An inclusive latitude/longitude box.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxToml {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionToml {
    #[serde(default = "default_precip_box")]
    pub precip: BoxToml,
    #[serde(default = "default_olr_box")]
    pub olr: BoxToml,
}

impl Default for RegionToml {
    fn default() -> Self {
        Self {
            precip: default_precip_box(),
            olr: default_olr_box(),
        }
    }
}

fn default_precip_box() -> BoxToml {
    BoxToml {
        lat_min: -12.5,
        lat_max: 30.5,
        lon_min: 60.5,
        lon_max: 95.5,
    }
}
fn default_olr_box() -> BoxToml {
    BoxToml {
        lat_min: -30.5,
        lat_max: 40.5,
        lon_min: 30.5,
        lon_max: 180.5,
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsToml {
    #[serde(default = "default_forecast_root")]
    pub forecast_root: PathBuf,
    #[serde(default = "default_analysis_dir")]
    pub analysis_dir: PathBuf,
    #[serde(default = "default_precip_climatology")]
    pub precip_climatology: PathBuf,
    #[serde(default = "default_olr_climatology")]
    pub olr_climatology: PathBuf,
    #[serde(default = "default_eigenvectors")]
    pub eigenvectors: PathBuf,
    #[serde(default = "default_score_std")]
    pub score_std: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Ensemble-mean trajectory JSON; not written when unset.
    #[serde(default)]
    pub summary: Option<PathBuf>,
}

impl Default for PathsToml {
    fn default() -> Self {
        Self {
            forecast_root: default_forecast_root(),
            analysis_dir: default_analysis_dir(),
            precip_climatology: default_precip_climatology(),
            olr_climatology: default_olr_climatology(),
            eigenvectors: default_eigenvectors(),
            score_std: default_score_std(),
            output_dir: default_output_dir(),
            summary: None,
        }
    }
}

fn default_forecast_root() -> PathBuf {
    PathBuf::from("~/forecast/prediction")
}
fn default_analysis_dir() -> PathBuf {
    PathBuf::from("avg_precip_analysis_output")
}
fn default_precip_climatology() -> PathBuf {
    PathBuf::from("precip_clim_hindcast_1993-2015_regrid.nc")
}
fn default_olr_climatology() -> PathBuf {
    PathBuf::from("climatology_olr_1x1.nc")
}
fn default_eigenvectors() -> PathBuf {
    PathBuf::from("EEOFS_MISO_1997_2016_GPCP_v1.3.nc")
}
fn default_score_std() -> PathBuf {
    PathBuf::from("Obs_MISO_scores_std_JJAS.nc")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("~/forecast/MISOs")
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariablesToml {
    #[serde(default = "default_forecast_precip")]
    pub forecast_precip: String,
    #[serde(default = "default_forecast_olr")]
    pub forecast_olr: String,
    #[serde(default = "default_analysis_precip")]
    pub analysis_precip: String,
    #[serde(default = "default_forecast_precip")]
    pub precip_climatology: String,
    #[serde(default = "default_forecast_olr")]
    pub olr_climatology: String,
    #[serde(default = "default_eigenvectors_var")]
    pub eigenvectors: String,
    #[serde(default = "default_score_std_var")]
    pub score_std: String,
    #[serde(default = "default_true")]
    pub include_olr: bool,
}

impl Default for VariablesToml {
    fn default() -> Self {
        Self {
            forecast_precip: default_forecast_precip(),
            forecast_olr: default_forecast_olr(),
            analysis_precip: default_analysis_precip(),
            precip_climatology: default_forecast_precip(),
            olr_climatology: default_forecast_olr(),
            eigenvectors: default_eigenvectors_var(),
            score_std: default_score_std_var(),
            include_olr: true,
        }
    }
}

fn default_forecast_precip() -> String {
    "tot_precip".to_string()
}
fn default_forecast_olr() -> String {
    "olr".to_string()
}
fn default_analysis_precip() -> String {
    "PRATE_surface".to_string()
}
fn default_eigenvectors_var() -> String {
    "miso_eeofs".to_string()
}
fn default_score_std_var() -> String {
    "miso_scores_std".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationToml {
    /// Fail the run on undefined anomaly values instead of warning.
    #[serde(default)]
    pub strict_undefined: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryToml {
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for RetryToml {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

fn default_attempts() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    500
}
