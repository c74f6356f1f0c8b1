// src/batch.rs
//! Region-wide load: roster first, then every session directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use glob::{glob, Pattern};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::config::Settings;
use crate::process::{data_file_name, Region};
use crate::schema::{load_order, DatasetType};
use crate::store::{load_file, LoadOutcome};

/// Session token of the legislator roster file.
pub const ROSTER_SESSION: &str = "00NA";

#[derive(Debug, Clone, Serialize)]
pub struct FailedLoad {
    pub file: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub region: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub loaded: Vec<LoadOutcome>,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<FailedLoad>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub files_loaded: usize,
    pub files_missing: usize,
    pub files_failed: usize,
    pub rows_inserted: u64,
    pub duplicates_skipped: u64,
    pub rows_dropped_by_cleaning: usize,
}

impl BatchReport {
    fn new(region: &Region) -> Self {
        Self {
            region: region.key(),
            started_at: Utc::now(),
            finished_at: None,
            loaded: Vec::new(),
            missing: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn totals(&self) -> Totals {
        let mut t = Totals {
            files_loaded: self.loaded.len(),
            files_missing: self.missing.len(),
            files_failed: self.failed.len(),
            ..Default::default()
        };
        for o in &self.loaded {
            t.rows_inserted += o.inserted;
            t.duplicates_skipped += o.skipped_duplicates;
            t.rows_dropped_by_cleaning += o.clean.rows_skipped();
        }
        t
    }
}

/// Every file a region load will look for, in load order: the roster, then
/// each session directory (sorted by name) with its datasets in dependency
/// order. Paths are returned whether or not they exist.
pub fn plan_region(data_root: &Path, region: &Region) -> Result<Vec<PathBuf>> {
    let region_dir = data_root.join(region.abbreviation);
    let mut plan = vec![region_dir.join(data_file_name(region, ROSTER_SESSION, DatasetType::People))];

    let pattern = format!("{}/*", Pattern::escape(&region_dir.to_string_lossy()));
    let mut sessions: Vec<PathBuf> = glob(&pattern)
        .with_context(|| format!("bad session pattern {}", pattern))?
        .filter_map(|entry| match entry {
            Ok(p) => Some(p),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|p| p.is_dir())
        .collect();
    sessions.sort();

    let order = load_order()?;
    for dir in sessions {
        let Some(token) = dir.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            warn!(dir = %dir.display(), "session directory name is not UTF-8; skipping");
            continue;
        };
        for dataset in &order {
            plan.push(dir.join(data_file_name(region, &token, *dataset)));
        }
    }
    Ok(plan)
}

/// Load every file of `region` under `data_root`.
///
/// Missing files are logged and recorded. A failed file stops the batch
/// unless `keep_going` is set, in which case it is recorded and skipped.
#[instrument(level = "info", skip(settings, data_root), fields(region = %region, root = %data_root.display()))]
pub async fn load_region(
    settings: &Settings,
    data_root: &Path,
    region: &Region,
    keep_going: bool,
) -> Result<BatchReport> {
    let mut report = BatchReport::new(region);
    let plan = plan_region(data_root, region)?;
    info!(candidates = plan.len(), "starting region load");

    for path in plan {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !path.is_file() {
            info!("NOT A FILE: {}", name);
            report.missing.push(path);
            continue;
        }
        match load_file(settings, &path).await {
            Ok(outcome) => report.loaded.push(outcome),
            Err(e) if keep_going => {
                error!("failed {}: {:#}", name, e);
                report.failed.push(FailedLoad {
                    file: path,
                    error: format!("{:#}", e),
                });
            }
            Err(e) => {
                return Err(e.context(format!("{} load stopped at {}", region, name)));
            }
        }
    }

    report.finished_at = Some(Utc::now());
    let t = report.totals();
    info!(
        loaded = t.files_loaded,
        missing = t.files_missing,
        failed = t.files_failed,
        inserted = t.rows_inserted,
        "region load finished"
    );
    Ok(report)
}
