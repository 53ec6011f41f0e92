use ignore::WalkBuilder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::pipeline::{self, PipelineOptions};
use super::planner::{plan_chunks, WorkUnit};
use crate::config::SearchConfig;
use crate::errors::{SearchError, SearchResult};
use crate::filters::should_include_file;
use crate::patterns::PatternSet;
use crate::results::{MatchRecord, ResultSink};

/// Everything one search job produced
#[derive(Debug, Default)]
pub struct SearchReport {
    /// Match records in arrival order; sort or group before display if
    /// a stable order matters
    pub records: Vec<MatchRecord>,
    /// Total number of records, also valid in count-only mode
    pub total_matches: usize,
}

/// Runs a complete search job: validate, plan, pipeline, resolve.
///
/// A single input file is split into byte-range chunks, one per
/// producer; several input files become one whole-file unit each.
pub fn search(config: &SearchConfig) -> SearchResult<SearchReport> {
    config.validate()?;
    info!("starting search with patterns: {:?}", config.patterns);

    let patterns = PatternSet::compile(&config.patterns, config.case_insensitive)?;
    let files = collect_files(config)?;

    debug!("planning {} input file(s)", files.len());
    let chunked = files.len() == 1;
    let units: Vec<WorkUnit> = if chunked {
        plan_chunks(&files[0], config.producer_threads.get())?
    } else {
        files
            .iter()
            .map(|path| WorkUnit::WholeFile {
                path: Arc::clone(path),
            })
            .collect()
    };

    let options = PipelineOptions {
        producer_threads: config.producer_threads.get(),
        consumer_threads: config.consumer_threads.get(),
        queue_capacity: config.queue_capacity,
        invert_match: config.invert_match,
    };

    let sink = ResultSink::new();
    let counts = pipeline::run(units, &patterns, config.record_builder(), &sink, &options);

    let mut records = sink.into_records();
    if chunked {
        debug!("resolving global line numbers over {} chunks", counts.len());
        counts.resolve(&mut records);
    }

    let total_matches = records.len();
    info!("search complete, {} match(es)", total_matches);

    Ok(SearchReport {
        records,
        total_matches,
    })
}

/// Resolves the input file list: explicit files plus, when requested, a
/// recursive walk of the root. Missing files and ignored extensions are
/// skipped per item; an empty final list fails the job.
fn collect_files(config: &SearchConfig) -> SearchResult<Vec<Arc<PathBuf>>> {
    let mut candidates: Vec<PathBuf> = config.files.clone();

    if config.recursive {
        for entry in WalkBuilder::new(&config.root_path).build() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file()) {
                        candidates.push(entry.into_path());
                    }
                }
                Err(e) => warn!("walk error under {}: {}", config.root_path.display(), e),
            }
        }
    }

    let mut files = Vec::with_capacity(candidates.len());
    for path in candidates {
        if !should_include_file(&path, &config.ignore_extensions) {
            debug!("ignoring {} by extension", path.display());
            continue;
        }
        if !path.is_file() {
            warn!("skipping {}: not a readable file", path.display());
            continue;
        }
        files.push(Arc::new(path));
    }

    if files.is_empty() {
        return Err(SearchError::NoInputFiles);
    }
    Ok(files)
}
