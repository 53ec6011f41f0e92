use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use super::planner::WorkUnit;

const BUFFER_CAPACITY: usize = 65536;

/// Lazy, finite, non-restartable sequence of `(local line number, text)`
/// pairs for one work unit.
///
/// The whole-file variant reads to EOF. The ranged variant seeks to the
/// chunk start and stops after the cumulative bytes read exceed the
/// chunk's byte budget; because the read happens in whole-line units the
/// last line may run past the budget. Chunk boundaries are pre-aligned
/// to line terminators, so the over-read never duplicates a line, but
/// the byte accounting is approximate by design.
#[derive(Debug)]
pub struct LineSource {
    reader: BufReader<File>,
    line_number: u64,
    budget: Option<u64>,
    bytes_read: u64,
    done: bool,
}

impl LineSource {
    /// Reads a file from start to EOF, numbering lines from 1
    pub fn whole_file(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::with_capacity(BUFFER_CAPACITY, file),
            line_number: 0,
            budget: None,
            bytes_read: 0,
            done: false,
        })
    }

    /// Reads whole lines from `start` until the byte budget
    /// `end - start` is exhausted, numbering lines from 1 within the chunk
    pub fn chunk(path: &Path, start: u64, end: u64) -> io::Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
        reader.seek(SeekFrom::Start(start))?;
        Ok(Self {
            reader,
            line_number: 0,
            budget: Some(end.saturating_sub(start)),
            bytes_read: 0,
            done: false,
        })
    }

    pub fn for_unit(unit: &WorkUnit) -> io::Result<Self> {
        match unit {
            WorkUnit::WholeFile { path } => Self::whole_file(path),
            WorkUnit::Chunk {
                path, start, end, ..
            } => Self::chunk(path, *start, *end),
        }
    }
}

impl Iterator for LineSource {
    type Item = io::Result<(u64, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(budget) = self.budget {
            if self.bytes_read > budget {
                self.done = true;
                return None;
            }
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                // Budget accounting uses the bytes actually consumed,
                // terminator included, so CRLF input stays exact.
                self.bytes_read += n as u64;
                self.line_number += 1;
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(Ok((self.line_number, line)))
            }
            Err(e) => {
                // A failed unit contributes no further lines
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
