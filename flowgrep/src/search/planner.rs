use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::errors::{SearchError, SearchResult};

/// One unit of work for a producer: a whole file, or a contiguous byte
/// range of a file split for parallel scanning.
///
/// For a chunked file the ranges are contiguous, non-overlapping, and
/// ordered by `index`; `end` is either the offset of a line terminator
/// or the file end, so no line ever straddles two chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnit {
    WholeFile {
        path: Arc<PathBuf>,
    },
    Chunk {
        path: Arc<PathBuf>,
        start: u64,
        end: u64,
        index: usize,
    },
}

impl WorkUnit {
    pub fn path(&self) -> &Arc<PathBuf> {
        match self {
            WorkUnit::WholeFile { path } => path,
            WorkUnit::Chunk { path, .. } => path,
        }
    }

    /// Chunk index for line-number resolution; whole files are chunk 0
    pub fn chunk_index(&self) -> usize {
        match self {
            WorkUnit::WholeFile { .. } => 0,
            WorkUnit::Chunk { index, .. } => *index,
        }
    }
}

/// Splits `[0, file_size)` into `target_chunks` byte ranges whose
/// boundaries never fall inside a line.
///
/// Each naive boundary is snapped forward to the next `\n`; the next
/// chunk starts one byte past it. The final chunk always ends at the
/// file end. When the file has fewer lines than `target_chunks`, the
/// trailing chunks are empty, which producers must tolerate.
///
/// Failure to open or stat the file is fatal for this file's search.
pub fn plan_chunks(path: &Arc<PathBuf>, target_chunks: usize) -> SearchResult<Vec<WorkUnit>> {
    debug_assert!(target_chunks > 0);

    let file = File::open(path.as_ref()).map_err(|e| SearchError::from_io(path, e))?;
    let file_size = file
        .metadata()
        .map_err(|e| SearchError::from_io(path, e))?
        .len();
    let mut reader = BufReader::new(file);

    let chunk_size = file_size / target_chunks as u64;
    let mut units = Vec::with_capacity(target_chunks);
    let mut start = 0u64;

    for index in 0..target_chunks {
        let end = if index == target_chunks - 1 {
            file_size
        } else {
            let naive = start.saturating_add(chunk_size).min(file_size);
            next_terminator(&mut reader, naive, file_size)?
        };

        units.push(WorkUnit::Chunk {
            path: Arc::clone(path),
            start,
            end,
            index,
        });

        // One past the terminator; clamped so trailing chunks are empty
        // rather than out of range once the file is exhausted.
        start = end.saturating_add(1).min(file_size);
    }

    debug!(
        "planned {} chunks over {} bytes of {}",
        units.len(),
        file_size,
        path.display()
    );
    Ok(units)
}

/// Scans forward from `from` for the next line terminator, returning
/// its offset, or `file_size` when the last line has no trailing newline.
fn next_terminator(
    reader: &mut BufReader<File>,
    from: u64,
    file_size: u64,
) -> SearchResult<u64> {
    reader.seek(SeekFrom::Start(from))?;
    let mut pos = from;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(file_size);
        }
        if let Some(i) = buf.iter().position(|&b| b == b'\n') {
            return Ok(pos + i as u64);
        }
        let n = buf.len();
        reader.consume(n);
        pos += n as u64;
    }
}
