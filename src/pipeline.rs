//! The forecast-to-index run: shared inputs, the per-pair loop, composite
//! assembly and output.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, info_span, warn};

use miso_anomaly::{AnomalySeries, ClimatologyTable, compute_anomaly};
use miso_calendar::{ForecastSchedule, date_tag, init_tag};
use miso_composite::{Composite, MemberKey, summarize, to_json};
use miso_eeof::{
    EigenvectorSet, EmbeddingConfig, IndexSeries, ScoreNormalizer, build_embedding, mode_name,
    project,
};
use miso_grid::{AlignmentCache, AlignmentPolicy, GriddedSeries, find_undefined, undefined_dates};
use miso_io::{
    FieldKind, ReaderConfig, analysis_path, forecast_path, output_path, read_climatology,
    read_eigenvectors, read_field, read_score_std, write_collection,
};

use crate::config::VariablesToml;

/// Resolved file locations.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub forecast_root: PathBuf,
    pub analysis_dir: PathBuf,
    pub precip_climatology: PathBuf,
    pub olr_climatology: PathBuf,
    pub eigenvectors: PathBuf,
    pub score_std: PathBuf,
    pub output_dir: PathBuf,
    pub summary: Option<PathBuf>,
}

/// Everything a run needs besides the anchor date.
#[derive(Debug, Clone)]
pub struct Settings {
    pub members: Vec<String>,
    pub n_initializations: usize,
    pub forecast_days: usize,
    pub model_tag: String,
    pub embedding: EmbeddingConfig,
    pub alignment: AlignmentPolicy,
    pub precip_reader: ReaderConfig,
    pub olr_reader: ReaderConfig,
    pub paths: InputPaths,
    pub variables: VariablesToml,
    pub strict_undefined: bool,
}

/// What a completed run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub schedule: ForecastSchedule,
    pub outputs: Vec<PathBuf>,
    pub summary: Option<PathBuf>,
    pub n_pairs: usize,
}

struct OlrInputs {
    clim: ClimatologyTable,
    grid: AlignmentCache,
}

/// Inputs shared by every (initialization, member) pair, on the operator grid.
struct SharedInputs {
    eofs: EigenvectorSet,
    normalizer: ScoreNormalizer,
    precip_clim: ClimatologyTable,
    precip_grid: AlignmentCache,
    history: Option<AnomalySeries>,
    olr: Option<OlrInputs>,
}

/// Warns about, or under `strict` rejects, undefined anomaly values.
fn check_undefined(label: &str, series: &GriddedSeries, strict: bool) -> Result<()> {
    let samples = find_undefined(series);
    if samples.is_empty() {
        return Ok(());
    }
    let dates = undefined_dates(series);
    let listed = dates
        .iter()
        .map(|d| date_tag(*d))
        .collect::<Vec<_>>()
        .join(",");
    let mut lats: Vec<f64> = samples.iter().map(|s| s.lat).collect();
    lats.sort_by(f64::total_cmp);
    lats.dedup();
    if strict {
        bail!(
            "{label} anomaly has {} undefined values on {listed} at latitudes {lats:?}",
            samples.len()
        );
    }
    warn!(
        field = label,
        n_samples = samples.len(),
        n_dates = dates.len(),
        dates = %listed,
        lats = ?lats,
        "undefined values in anomaly"
    );
    Ok(())
}

fn load_history(
    settings: &Settings,
    schedule: &ForecastSchedule,
    grid: &AlignmentCache,
    clim: &ClimatologyTable,
) -> Result<Option<AnomalySeries>> {
    let cut = settings.embedding.cut();
    let Some((start, end)) = schedule.history_window(cut)? else {
        return Ok(None);
    };

    let path = analysis_path(&settings.paths.analysis_dir, schedule.anchor())?;
    let field = read_field(&path, &settings.variables.analysis_precip, &settings.precip_reader)
        .with_context(|| format!("failed to read lagged analysis: {}", path.display()))?;
    let window = field
        .select_window(start, end)
        .with_context(|| format!("analysis {} does not cover the lag history", path.display()))?;
    ensure!(
        window.len() == cut,
        "analysis {} covers {} of the {cut} history days {}..{}",
        path.display(),
        window.len(),
        date_tag(start),
        date_tag(end)
    );

    let aligned = grid.get(window.lats())?.apply_series(&window)?;
    let anomaly = compute_anomaly(&aligned, clim).context("lagged analysis anomaly")?;
    check_undefined("lagged analysis", anomaly.as_series(), settings.strict_undefined)?;
    info!(days = cut, start = %date_tag(start), end = %date_tag(end), "lag history loaded");
    Ok(Some(anomaly))
}

fn load_shared(settings: &Settings, schedule: &ForecastSchedule) -> Result<SharedInputs> {
    let paths = &settings.paths;
    let vars = &settings.variables;
    let retry = settings.precip_reader.retry();
    let tau = usize::try_from(settings.embedding.tau()).context("tau must be non-negative")?;

    let eofs = read_eigenvectors(&paths.eigenvectors, &vars.eigenvectors, tau, retry)
        .with_context(|| format!("failed to read eigenvectors: {}", paths.eigenvectors.display()))?;
    let expected_lags = settings.embedding.lags();
    ensure!(
        eofs.lags() == expected_lags.as_slice(),
        "eigenvector lags {:?} do not match tau={} embedding={}",
        eofs.lags(),
        settings.embedding.tau(),
        settings.embedding.embedding()
    );

    let normalizer = read_score_std(&paths.score_std, &vars.score_std, retry)
        .with_context(|| format!("failed to read score std: {}", paths.score_std.display()))?;
    ensure!(
        normalizer.n_modes() == eofs.n_modes(),
        "{} score standard deviations for {} eigenvector modes",
        normalizer.n_modes(),
        eofs.n_modes()
    );

    let precip_grid = AlignmentCache::new(eofs.lats().to_vec(), settings.alignment);
    let clim = read_climatology(
        &paths.precip_climatology,
        &vars.precip_climatology,
        &settings.precip_reader,
    )
    .with_context(|| {
        format!(
            "failed to read precipitation climatology: {}",
            paths.precip_climatology.display()
        )
    })?;
    let alignment = precip_grid.get(clim.lats())?;
    if alignment.max_offset() > 0.0 {
        info!(max_offset = alignment.max_offset(), "climatology snapped to eigenvector latitudes");
    }
    let precip_clim = clim.aligned_to(&alignment)?;

    let history = load_history(settings, schedule, &precip_grid, &precip_clim)?;

    let olr = if vars.include_olr {
        let clim = read_climatology(&paths.olr_climatology, &vars.olr_climatology, &settings.olr_reader)
            .with_context(|| {
                format!("failed to read OLR climatology: {}", paths.olr_climatology.display())
            })?;
        let grid = AlignmentCache::new(clim.lats().to_vec(), settings.alignment);
        Some(OlrInputs { clim, grid })
    } else {
        None
    };

    Ok(SharedInputs {
        eofs,
        normalizer,
        precip_clim,
        precip_grid,
        history,
        olr,
    })
}

struct PairContext<'a> {
    settings: &'a Settings,
    schedule: &'a ForecastSchedule,
    shared: &'a SharedInputs,
}

impl PairContext<'_> {
    fn read_window(
        &self,
        init: NaiveDate,
        member: &str,
        kind: FieldKind,
        var: &str,
        reader: &ReaderConfig,
    ) -> Result<GriddedSeries> {
        let path = forecast_path(&self.settings.paths.forecast_root, init, member, kind)?;
        let field = read_field(&path, var, reader)
            .with_context(|| format!("failed to read forecast: {}", path.display()))?;
        let (start, end) = self.schedule.forecast_window();
        let window = field
            .select_window(start, end)
            .with_context(|| format!("forecast {} misses the lead window", path.display()))?;
        let dates = self.schedule.forecast_dates();
        if window.len() == dates.len() {
            return Ok(window);
        }
        let missing = dates
            .iter()
            .filter(|&&d| window.times().binary_search(&d).is_err())
            .map(|d| date_tag(*d))
            .collect::<Vec<_>>()
            .join(",");
        warn!(
            path = %path.display(),
            expected = dates.len(),
            got = window.len(),
            missing = %missing,
            "forecast covers part of the lead window"
        );
        Ok(window.reindex(&dates)?)
    }

    fn olr_diagnostic(&self, init: NaiveDate, member: &str, olr: &OlrInputs) -> Result<()> {
        let window = self.read_window(
            init,
            member,
            FieldKind::Olr,
            &self.settings.variables.forecast_olr,
            &self.settings.olr_reader,
        )?;
        let aligned = olr.grid.get(window.lats())?.apply_series(&window)?;
        let anomaly = compute_anomaly(&aligned, &olr.clim).context("OLR anomaly")?;
        check_undefined("OLR", anomaly.as_series(), self.settings.strict_undefined)?;
        debug!(n_times = anomaly.as_series().len(), "OLR anomaly computed");
        Ok(())
    }

    fn process(&self, init: NaiveDate, member: &str) -> Result<(MemberKey, Vec<IndexSeries>)> {
        let _span = info_span!(
            "pair",
            anchor = %date_tag(self.schedule.anchor()),
            init = %init_tag(init),
            member
        )
        .entered();
        let settings = self.settings;
        let shared = self.shared;

        let window = self.read_window(
            init,
            member,
            FieldKind::Precip,
            &settings.variables.forecast_precip,
            &settings.precip_reader,
        )?;
        let aligned = shared.precip_grid.get(window.lats())?.apply_series(&window)?;
        let anomaly = compute_anomaly(&aligned, &shared.precip_clim)
            .context("precipitation anomaly")?;
        check_undefined("precipitation", anomaly.as_series(), settings.strict_undefined)?;

        if let Some(olr) = &shared.olr {
            self.olr_diagnostic(init, member, olr)?;
        }

        let full = match &shared.history {
            Some(history) => anomaly.with_history(history)?,
            None => anomaly.clone(),
        };
        let embedded = build_embedding(
            full.as_series(),
            settings.embedding.tau(),
            settings.embedding.embedding(),
        )?;
        let scores = project(&embedded, &shared.eofs, &shared.normalizer)?;

        let forecast_times = anomaly.as_series().times().to_vec();
        let scores = scores
            .iter()
            .map(|s| s.restamped(forecast_times.clone()))
            .collect::<Result<Vec<_>, _>>()
            .context("scores do not line up with forecast dates")?;

        debug!(n_times = forecast_times.len(), "scores computed");
        Ok((MemberKey::new(init, member), scores))
    }
}

/// Runs the whole forecast-to-index computation for `anchor`.
///
/// Any failing (initialization, member) pair fails the run.
pub fn run(settings: &Settings, anchor: NaiveDate) -> Result<RunOutcome> {
    let schedule =
        ForecastSchedule::new(anchor, settings.n_initializations, settings.forecast_days)?;
    let span = info_span!("run", anchor = %date_tag(anchor));
    let _guard = span.enter();
    info!(
        initializations = %schedule.ic_range_tag(),
        n_members = settings.members.len(),
        forecast_days = schedule.forecast_days(),
        "run started"
    );

    let shared = load_shared(settings, &schedule)?;
    info!(
        n_modes = shared.eofs.n_modes(),
        n_lat = shared.eofs.lats().len(),
        "shared inputs loaded"
    );

    let pairs: Vec<(NaiveDate, &str)> = schedule
        .initializations()
        .iter()
        .flat_map(|&init| settings.members.iter().map(move |m| (init, m.as_str())))
        .collect();
    let ctx = PairContext {
        settings,
        schedule: &schedule,
        shared: &shared,
    };
    let results = pairs
        .par_iter()
        .map(|&(init, member)| {
            ctx.process(init, member).with_context(|| {
                format!("initialization {} member {member}", init_tag(init))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let modes = (0..shared.eofs.n_modes()).map(mode_name).collect();
    let mut composite = Composite::new(modes);
    for (key, scores) in results {
        composite.insert(key, scores)?;
    }

    let paths = &settings.paths;
    fs::create_dir_all(&paths.output_dir)
        .with_context(|| format!("failed to create {}", paths.output_dir.display()))?;
    let mut outputs = Vec::with_capacity(composite.modes().len());
    for (m, name) in composite.modes().iter().enumerate() {
        let path = output_path(&paths.output_dir, name, &settings.model_tag, &schedule);
        write_collection(&path, &composite.collection(m)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        outputs.push(path);
    }

    let summary = match &paths.summary {
        Some(path) => {
            let summary = summarize(&composite, anchor)?;
            if let Some(first) = summary.trajectory.first() {
                info!(
                    date = %first.date,
                    miso1 = first.miso1,
                    miso2 = first.miso2,
                    amplitude = first.amplitude,
                    "ensemble mean at first lead"
                );
            }
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, to_json(&summary)?)
                .with_context(|| format!("failed to write summary: {}", path.display()))?;
            Some(path.clone())
        }
        None => None,
    };

    info!(n_pairs = composite.len(), n_outputs = outputs.len(), "run complete");
    Ok(RunOutcome {
        schedule,
        outputs,
        summary,
        n_pairs: composite.len(),
    })
}
