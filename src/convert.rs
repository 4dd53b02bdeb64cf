//! Pure conversion functions: TOML config structs -> crate API config types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};

use miso_eeof::EmbeddingConfig;
use miso_grid::AlignmentPolicy;
use miso_io::{ReaderConfig, RegionBox, RetryPolicy};

use crate::config::*;
use crate::pipeline::{InputPaths, Settings};

/// Parses an alignment policy name into the corresponding enum variant.
pub fn parse_alignment(s: &str) -> Result<AlignmentPolicy> {
    match s.to_lowercase().as_str() {
        "exact" => Ok(AlignmentPolicy::Exact),
        "nearest" => Ok(AlignmentPolicy::Nearest),
        other => bail!("unknown alignment policy: {other:?}"),
    }
}

/// Replaces a leading `~` with `home`.
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

pub fn build_region(b: &BoxToml) -> RegionBox {
    RegionBox {
        lat_min: b.lat_min,
        lat_max: b.lat_max,
        lon_min: b.lon_min,
        lon_max: b.lon_max,
    }
}

pub fn build_retry(r: &RetryToml) -> RetryPolicy {
    RetryPolicy::default()
        .with_attempts(r.attempts)
        .with_backoff(Duration::from_millis(r.backoff_ms))
}

/// Builds a validated [`ReaderConfig`] for one field's box.
pub fn build_reader_config(region: &BoxToml, retry: &RetryToml) -> Result<ReaderConfig> {
    let cfg = ReaderConfig::default()
        .with_region(build_region(region))
        .with_retry(build_retry(retry));
    cfg.validate().context("invalid reader configuration")?;
    Ok(cfg)
}

pub fn build_embedding_config(e: &EeofToml) -> Result<EmbeddingConfig> {
    EmbeddingConfig::new(e.tau, e.embedding)
        .validate()
        .context("invalid [eeof] configuration")
}

fn build_paths(p: &PathsToml, home: Option<&Path>) -> InputPaths {
    InputPaths {
        forecast_root: expand_home(&p.forecast_root, home),
        analysis_dir: expand_home(&p.analysis_dir, home),
        precip_climatology: expand_home(&p.precip_climatology, home),
        olr_climatology: expand_home(&p.olr_climatology, home),
        eigenvectors: expand_home(&p.eigenvectors, home),
        score_std: expand_home(&p.score_std, home),
        output_dir: expand_home(&p.output_dir, home),
        summary: p.summary.as_deref().map(|s| expand_home(s, home)),
    }
}

/// Resolves the whole configuration into run settings.
///
/// `home` replaces a leading `~` in every path.
pub fn build_settings(config: &MisoConfig, home: Option<&Path>) -> Result<Settings> {
    if config.run.members.is_empty() {
        bail!("[run].members must name at least one ensemble member");
    }
    if config.run.forecast_days == 0 {
        bail!("[run].forecast_days must be at least 1");
    }
    Ok(Settings {
        members: config.run.members.clone(),
        n_initializations: config.run.n_initializations,
        forecast_days: config.run.forecast_days,
        model_tag: config.run.model_tag.clone(),
        embedding: build_embedding_config(&config.eeof)?,
        alignment: parse_alignment(&config.eeof.alignment)?,
        precip_reader: build_reader_config(&config.region.precip, &config.retry)?,
        olr_reader: build_reader_config(&config.region.olr, &config.retry)?,
        paths: build_paths(&config.paths, home),
        variables: config.variables.clone(),
        strict_undefined: config.validation.strict_undefined,
    })
}
