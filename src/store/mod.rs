//! Persistence of sequence records and analysis run summaries.
//!
//! Records are kept as pretty-printed JSON under a single directory:
//! `sequences.json` holds one row per starting number and
//! `analysis_results.json` holds the run summaries in insertion order.

use crate::models::{AnalysisRunSummary, RangeSummary, SequenceAnalysis, SequenceRecord};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SEQUENCES_FILE: &str = "sequences.json";
const ANALYSIS_RESULTS_FILE: &str = "analysis_results.json";

/// Storage for per-sequence rows and run summaries.
pub trait RecordStore: Send {
    /// Insert or replace records keyed by `starting_number`. Returns the number written.
    fn upsert_sequences(&mut self, records: &[SequenceRecord]) -> Result<usize>;

    /// Append a run summary and return its assigned id.
    fn insert_analysis_result(&mut self, summary: AnalysisRunSummary) -> Result<u64>;

    /// Stored records ordered by starting number.
    fn list_sequences(&self, limit: Option<usize>) -> Result<Vec<SequenceRecord>>;

    /// Stored run summaries in insertion order.
    fn list_analysis_results(&self) -> Result<Vec<AnalysisRunSummary>>;

    /// Whether the store is usable.
    fn check(&self) -> bool;
}

/// A [`RecordStore`] backed by JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create store directory: {}", dir.display()))?;
        info!("Record store at {}", dir.display());
        Ok(Self { dir })
    }

    /// The directory holding the record files.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn load_sequences(&self) -> Result<BTreeMap<u64, SequenceRecord>> {
        let rows: Vec<SequenceRecord> = read_json(&self.dir.join(SEQUENCES_FILE))?;
        Ok(rows.into_iter().map(|r| (r.starting_number, r)).collect())
    }
}

impl RecordStore for JsonFileStore {
    fn upsert_sequences(&mut self, records: &[SequenceRecord]) -> Result<usize> {
        let mut rows = self.load_sequences()?;
        for record in records {
            rows.insert(record.starting_number, record.clone());
        }

        let rows: Vec<&SequenceRecord> = rows.values().collect();
        write_json(&self.dir.join(SEQUENCES_FILE), &rows)?;
        debug!("Upserted {} sequence records ({} stored)", records.len(), rows.len());

        Ok(records.len())
    }

    fn insert_analysis_result(&mut self, mut summary: AnalysisRunSummary) -> Result<u64> {
        let path = self.dir.join(ANALYSIS_RESULTS_FILE);
        let mut results: Vec<AnalysisRunSummary> = read_json(&path)?;

        let id = results.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        summary.id = id;
        results.push(summary);

        write_json(&path, &results)?;
        debug!("Stored analysis result {}", id);

        Ok(id)
    }

    fn list_sequences(&self, limit: Option<usize>) -> Result<Vec<SequenceRecord>> {
        let rows = self.load_sequences()?.into_values();
        Ok(match limit {
            Some(limit) => rows.take(limit).collect(),
            None => rows.collect(),
        })
    }

    fn list_analysis_results(&self) -> Result<Vec<AnalysisRunSummary>> {
        read_json(&self.dir.join(ANALYSIS_RESULTS_FILE))
    }

    fn check(&self) -> bool {
        fs::metadata(&self.dir)
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }
}

/// Persist the per-sequence rows of a run and its summary. Returns the run id.
pub fn save_run(
    store: &mut dyn RecordStore,
    analysis_type: &str,
    range_start: i64,
    range_end: i64,
    results: &[SequenceAnalysis],
    metadata: Value,
) -> Result<u64> {
    let records: Vec<SequenceRecord> = results.iter().map(SequenceRecord::from).collect();
    store.upsert_sequences(&records)?;

    let summary = RangeSummary::from_analyses(results);
    let run = AnalysisRunSummary::new(analysis_type, range_start, range_end, &summary, metadata);
    let id = store.insert_analysis_result(run)?;

    info!(
        "Saved {} run {} ({} sequences, range {}..={})",
        analysis_type,
        id,
        records.len(),
        range_start,
        range_end
    );
    Ok(id)
}

/// Read a JSON array file; a missing file is an empty list.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write a JSON file through a temporary file so readers never see a partial write.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
