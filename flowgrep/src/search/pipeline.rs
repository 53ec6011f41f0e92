use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};

use super::planner::WorkUnit;
use super::source::LineSource;
use crate::patterns::PatternSet;
use crate::results::{RecordBuilder, ResultSink};

/// One discovered line in flight from a producer to a consumer.
///
/// Produced exactly once per physical line of a work unit; ownership
/// moves producer -> queue -> consumer.
#[derive(Debug, Clone)]
pub struct LineRecord {
    pub source: Arc<PathBuf>,
    pub chunk: usize,
    pub line_number: u64,
    pub text: String,
}

/// Worker-pool sizing and mode flags for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub producer_threads: usize,
    pub consumer_threads: usize,
    /// Line queue capacity; `None` means unbounded
    pub queue_capacity: Option<usize>,
    pub invert_match: bool,
}

/// Per-chunk line counts, filled in as producers finish their units.
///
/// Slots are written once per chunk and only read after every producer
/// has joined, so relaxed atomics are enough.
#[derive(Debug)]
pub struct ChunkLineCounts {
    counts: Vec<AtomicU64>,
}

impl ChunkLineCounts {
    pub fn new(chunks: usize) -> Self {
        Self {
            counts: (0..chunks).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    pub fn record(&self, chunk: usize, lines: u64) {
        self.counts[chunk].store(lines, Ordering::Relaxed);
    }

    pub fn count(&self, chunk: usize) -> u64 {
        self.counts[chunk].load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Prefix sums: `offsets()[i]` is the number of lines in every chunk
    /// before chunk `i`.
    pub fn offsets(&self) -> Vec<u64> {
        let mut offsets = Vec::with_capacity(self.counts.len());
        let mut total = 0u64;
        for count in &self.counts {
            offsets.push(total);
            total += count.load(Ordering::Relaxed);
        }
        offsets
    }

    /// Converts each record's chunk-local line number into a global file
    /// line number. Must only run after the pipeline has joined; a
    /// chunk's line count is unknown until its producer finishes.
    pub fn resolve(&self, records: &mut [crate::results::MatchRecord]) {
        let offsets = self.offsets();
        for record in records {
            if let Some(n) = record.line_number.as_mut() {
                *n += offsets[record.chunk];
            }
        }
    }
}

/// Runs the producer/consumer pipeline over `units` to completion.
///
/// Producers drain the pre-loaded work queue with `try_recv` (the queue
/// is closed before any producer starts, so empty means done) and push
/// every line onto the line queue; a bounded queue makes that push the
/// backpressure point. Consumers iterate the line queue until it
/// disconnects, which happens exactly when the last producer drops its
/// sender, so there is no polling loop and no sentinel value to get
/// wrong. The scoped join means all per-chunk line counts are final by
/// the time this returns.
pub fn run(
    units: Vec<WorkUnit>,
    patterns: &PatternSet,
    builder: RecordBuilder,
    sink: &ResultSink,
    options: &PipelineOptions,
) -> ChunkLineCounts {
    let chunk_slots = units
        .iter()
        .map(|u| u.chunk_index() + 1)
        .max()
        .unwrap_or(0);
    let counts = ChunkLineCounts::new(chunk_slots);

    let (work_tx, work_rx) = unbounded::<WorkUnit>();
    for unit in units {
        // Receiver is alive, send cannot fail here
        let _ = work_tx.send(unit);
    }
    drop(work_tx);

    let (line_tx, line_rx) = match options.queue_capacity {
        Some(cap) => bounded::<LineRecord>(cap),
        None => unbounded::<LineRecord>(),
    };

    debug!(
        producers = options.producer_threads,
        consumers = options.consumer_threads,
        "dispatching pipeline"
    );

    thread::scope(|s| {
        for id in 0..options.producer_threads {
            let work_rx = work_rx.clone();
            let line_tx = line_tx.clone();
            let counts = &counts;
            s.spawn(move || producer_loop(id, work_rx, line_tx, counts));
        }
        // The scope now holds the only senders; the line queue
        // disconnects when the last producer returns.
        drop(line_tx);

        for id in 0..options.consumer_threads {
            let line_rx = line_rx.clone();
            s.spawn(move || {
                consumer_loop(id, line_rx, patterns, builder, sink, options.invert_match)
            });
        }
    });

    debug!("pipeline drained");
    counts
}

/// Takes units off the work queue until it is empty and streams their
/// lines into the line queue.
fn producer_loop(
    id: usize,
    work_rx: Receiver<WorkUnit>,
    line_tx: Sender<LineRecord>,
    counts: &ChunkLineCounts,
) {
    while let Ok(unit) = work_rx.try_recv() {
        let lines = produce_unit(&unit, &line_tx);
        if let WorkUnit::Chunk { index, .. } = unit {
            counts.record(index, lines);
        }
    }
    trace!("producer {} finished", id);
}

/// Streams one unit's lines; returns how many lines it read.
///
/// An I/O failure aborts only this unit: the error is logged, the count
/// of lines read so far is still recorded, and the pool moves on.
fn produce_unit(unit: &WorkUnit, line_tx: &Sender<LineRecord>) -> u64 {
    let source = match LineSource::for_unit(unit) {
        Ok(source) => source,
        Err(e) => {
            warn!("skipping {}: {}", unit.path().display(), e);
            return 0;
        }
    };

    let path = unit.path();
    let chunk = unit.chunk_index();
    let mut lines_read = 0u64;

    for item in source {
        match item {
            Ok((line_number, text)) => {
                lines_read = line_number;
                let record = LineRecord {
                    source: Arc::clone(path),
                    chunk,
                    line_number,
                    text,
                };
                if line_tx.send(record).is_err() {
                    // Consumers are gone; the job is shutting down
                    break;
                }
            }
            Err(e) => {
                warn!("read error in {}: {}", path.display(), e);
                break;
            }
        }
    }

    lines_read
}

/// Matches queued lines against the pattern set until the queue closes.
///
/// Normal mode appends one record per match occurrence, carrying the
/// matched substring. Inverted mode appends one whole-line record per
/// pattern that finds no match, deliberately mirroring the per-pattern
/// inverted semantics of the original tool.
fn consumer_loop(
    id: usize,
    line_rx: Receiver<LineRecord>,
    patterns: &PatternSet,
    builder: RecordBuilder,
    sink: &ResultSink,
    invert_match: bool,
) {
    for record in line_rx.iter() {
        if invert_match {
            for re in patterns.iter() {
                if !re.is_match(&record.text) {
                    sink.push(builder.build(
                        record.line_number,
                        &record.text,
                        &record.source,
                        re.as_str(),
                        record.chunk,
                    ));
                }
            }
        } else {
            for re in patterns.iter() {
                for m in re.find_iter(&record.text) {
                    sink.push(builder.build(
                        record.line_number,
                        m.as_str(),
                        &record.source,
                        re.as_str(),
                        record.chunk,
                    ));
                }
            }
        }
    }
    trace!("consumer {} finished", id);
}
