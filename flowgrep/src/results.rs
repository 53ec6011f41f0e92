use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A single reported match.
///
/// Every field except `chunk` is populated only when the corresponding
/// report flag asked for it; unrequested fields are `None`, not empty.
/// `chunk` is bookkeeping for global line-number resolution and is 0
/// for whole-file work units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Line number, local to the work unit until resolved
    pub line_number: Option<u64>,
    /// The matched substring (normal mode) or the whole line (inverted mode)
    pub text: Option<String>,
    /// Path of the file the line came from
    pub source: Option<Arc<PathBuf>>,
    /// Source text of the pattern that matched (or failed to, inverted)
    pub pattern: Option<String>,
    /// Index of the byte-range chunk this record came from
    pub chunk: usize,
}

/// Selects which fields a built record carries.
///
/// All 16 combinations of the four flags are valid; with every flag off
/// the record is empty but still counts toward the total, which is all
/// count-only mode needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordBuilder {
    pub show_line_numbers: bool,
    pub show_lines: bool,
    pub show_source: bool,
    pub show_pattern: bool,
}

impl RecordBuilder {
    pub fn new(
        show_line_numbers: bool,
        show_lines: bool,
        show_source: bool,
        show_pattern: bool,
    ) -> Self {
        Self {
            show_line_numbers,
            show_lines,
            show_source,
            show_pattern,
        }
    }

    /// Builds a record with exactly the requested fields populated.
    pub fn build(
        &self,
        line_number: u64,
        text: &str,
        source: &Arc<PathBuf>,
        pattern: &str,
        chunk: usize,
    ) -> MatchRecord {
        MatchRecord {
            line_number: self.show_line_numbers.then_some(line_number),
            text: self.show_lines.then(|| text.to_string()),
            source: self.show_source.then(|| Arc::clone(source)),
            pattern: self.show_pattern.then(|| pattern.to_string()),
            chunk,
        }
    }
}

/// Thread-safe accumulator of match records.
///
/// Shared by every consumer through an `Arc`; `push` is the only
/// mutation. The running count is kept in an atomic so count-only
/// callers never touch the lock.
#[derive(Debug, Default)]
pub struct ResultSink {
    records: Mutex<Vec<MatchRecord>>,
    count: AtomicUsize,
}

impl ResultSink {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&self, record: MatchRecord) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.records
            .lock()
            .expect("result sink lock poisoned")
            .push(record);
    }

    /// Total records appended so far
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the sink; call after every worker has joined.
    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
            .into_inner()
            .expect("result sink lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Arc<PathBuf> {
        Arc::new(PathBuf::from("test.txt"))
    }

    #[test]
    fn test_builder_all_fields() {
        let builder = RecordBuilder::new(true, true, true, true);
        let rec = builder.build(42, "hello", &source(), "h.*o", 3);
        assert_eq!(rec.line_number, Some(42));
        assert_eq!(rec.text.as_deref(), Some("hello"));
        assert_eq!(rec.source.as_deref(), Some(&PathBuf::from("test.txt")));
        assert_eq!(rec.pattern.as_deref(), Some("h.*o"));
        assert_eq!(rec.chunk, 3);
    }

    #[test]
    fn test_builder_no_fields_still_counts() {
        let builder = RecordBuilder::new(false, false, false, false);
        let rec = builder.build(42, "hello", &source(), "h", 0);
        assert_eq!(rec.line_number, None);
        assert_eq!(rec.text, None);
        assert_eq!(rec.source, None);
        assert_eq!(rec.pattern, None);

        let sink = ResultSink::new();
        sink.push(rec);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_builder_all_sixteen_combinations() {
        for bits in 0..16u8 {
            let builder = RecordBuilder::new(
                bits & 1 != 0,
                bits & 2 != 0,
                bits & 4 != 0,
                bits & 8 != 0,
            );
            let rec = builder.build(7, "line", &source(), "p", 0);
            assert_eq!(rec.line_number.is_some(), bits & 1 != 0);
            assert_eq!(rec.text.is_some(), bits & 2 != 0);
            assert_eq!(rec.source.is_some(), bits & 4 != 0);
            assert_eq!(rec.pattern.is_some(), bits & 8 != 0);
        }
    }

    #[test]
    fn test_sink_concurrent_push() {
        let sink = Arc::new(ResultSink::new());
        let builder = RecordBuilder::new(true, false, false, false);

        std::thread::scope(|s| {
            for t in 0..8u64 {
                let sink = Arc::clone(&sink);
                s.spawn(move || {
                    for i in 0..100u64 {
                        sink.push(builder.build(t * 100 + i, "", &source(), "", 0));
                    }
                });
            }
        });

        assert_eq!(sink.len(), 800);
        let sink = Arc::try_unwrap(sink).unwrap();
        assert_eq!(sink.into_records().len(), 800);
    }
}
