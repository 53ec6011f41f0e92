use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{SearchError, SearchResult};
use crate::results::RecordBuilder;

/// Configuration for one search job.
///
/// Loadable from YAML (global `$CONFIG_DIR/flowgrep/config.yaml`, local
/// `.flowgrep.yaml`, or an explicit path) with CLI values layered on
/// top via `merge_with_cli`. Example:
///
/// ```yaml
/// patterns: ["TODO|FIXME"]
/// files: ["notes.txt"]
/// show_line_numbers: true
/// producer_threads: 4
/// consumer_threads: 4
/// log_level: "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The search patterns (regex syntax)
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Files to search; a single entry is split into byte-range chunks,
    /// several entries become one whole-file work unit each
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Root directory for recursive enumeration
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Recursively add regular files under `root_path` to the input list
    #[serde(default)]
    pub recursive: bool,

    /// File-name suffixes to skip (e.g. [".log", ".bin"])
    #[serde(default)]
    pub ignore_extensions: Vec<String>,

    /// Match patterns case-insensitively
    #[serde(default)]
    pub case_insensitive: bool,

    /// Report lines that fail to match instead of lines that match
    #[serde(default)]
    pub invert_match: bool,

    /// Report only the total match count
    #[serde(default)]
    pub count_only: bool,

    /// Populate line numbers in each record
    #[serde(default)]
    pub show_line_numbers: bool,

    /// Populate the matched text (or whole line, inverted) in each record
    #[serde(default)]
    pub show_lines: bool,

    /// Populate the source file path in each record
    #[serde(default)]
    pub show_source: bool,

    /// Populate the matched pattern in each record
    #[serde(default)]
    pub show_pattern: bool,

    /// Number of producer threads (default: CPU cores)
    #[serde(default = "default_thread_count")]
    pub producer_threads: NonZeroUsize,

    /// Number of consumer threads (default: CPU cores)
    #[serde(default = "default_thread_count")]
    pub consumer_threads: NonZeroUsize,

    /// Line queue capacity; `None` means unbounded
    #[serde(default)]
    pub queue_capacity: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            files: Vec::new(),
            root_path: default_root_path(),
            recursive: false,
            ignore_extensions: Vec::new(),
            case_insensitive: false,
            invert_match: false,
            count_only: false,
            show_line_numbers: false,
            show_lines: false,
            show_source: false,
            show_pattern: false,
            producer_threads: default_thread_count(),
            consumer_threads: default_thread_count(),
            queue_capacity: None,
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("flowgrep/config.yaml")),
            Some(PathBuf::from(".flowgrep.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    /// CLI values take precedence.
    pub fn merge_with_cli(mut self, cli: SearchConfig) -> Self {
        if !cli.patterns.is_empty() {
            self.patterns = cli.patterns;
        }
        if !cli.files.is_empty() {
            self.files = cli.files;
        }
        if cli.root_path != default_root_path() {
            self.root_path = cli.root_path;
        }
        if !cli.ignore_extensions.is_empty() {
            self.ignore_extensions = cli.ignore_extensions;
        }
        self.recursive |= cli.recursive;
        self.case_insensitive |= cli.case_insensitive;
        self.invert_match |= cli.invert_match;
        self.count_only |= cli.count_only;
        self.show_line_numbers |= cli.show_line_numbers;
        self.show_lines |= cli.show_lines;
        self.show_source |= cli.show_source;
        self.show_pattern |= cli.show_pattern;
        self.producer_threads = cli.producer_threads;
        self.consumer_threads = cli.consumer_threads;
        if cli.queue_capacity.is_some() {
            self.queue_capacity = cli.queue_capacity;
        }
        if cli.log_level != default_log_level() {
            self.log_level = cli.log_level;
        }
        self
    }

    /// Rejects flag combinations the report cannot honor.
    ///
    /// Count-only output has no records, so asking for record fields at
    /// the same time is a contradiction rather than a silent no-op.
    pub fn validate(&self) -> SearchResult<()> {
        if self.count_only
            && (self.show_line_numbers || self.show_lines || self.show_source || self.show_pattern)
        {
            return Err(SearchError::config_error(
                "count-only cannot be combined with line-number, line, source, or pattern output",
            ));
        }
        Ok(())
    }

    /// The field selection this configuration asks for
    pub fn record_builder(&self) -> RecordBuilder {
        RecordBuilder::new(
            self.show_line_numbers,
            self.show_lines,
            self.show_source,
            self.show_pattern,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            patterns: ["TODO|FIXME"]
            files: ["notes.txt"]
            ignore_extensions: [".log"]
            show_line_numbers: true
            producer_threads: 4
            consumer_threads: 2
            queue_capacity: 1024
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.patterns, vec!["TODO|FIXME"]);
        assert_eq!(config.files, vec![PathBuf::from("notes.txt")]);
        assert_eq!(config.ignore_extensions, vec![".log".to_string()]);
        assert!(config.show_line_numbers);
        assert_eq!(config.producer_threads, NonZeroUsize::new(4).unwrap());
        assert_eq!(config.consumer_threads, NonZeroUsize::new(2).unwrap());
        assert_eq!(config.queue_capacity, Some(1024));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let config_content = r#"
            patterns: ["test"]
        "#;

        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = SearchConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.patterns, vec!["test"]);
        assert!(config.files.is_empty());
        assert!(!config.invert_match);
        assert!(!config.count_only);
        assert_eq!(config.queue_capacity, None);
        assert_eq!(
            config.producer_threads,
            NonZeroUsize::new(num_cpus::get()).unwrap()
        );
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = SearchConfig {
            patterns: vec!["TODO".to_string()],
            files: vec![PathBuf::from("a.txt")],
            log_level: "info".to_string(),
            ..Default::default()
        };

        let cli_config = SearchConfig {
            patterns: vec!["FIXME".to_string()],
            show_lines: true,
            producer_threads: NonZeroUsize::new(8).unwrap(),
            consumer_threads: NonZeroUsize::new(8).unwrap(),
            ..Default::default()
        };

        let merged = file_config.merge_with_cli(cli_config);
        assert_eq!(merged.patterns, vec!["FIXME"]); // CLI value
        assert_eq!(merged.files, vec![PathBuf::from("a.txt")]); // file value kept
        assert!(merged.show_lines);
        assert_eq!(merged.producer_threads, NonZeroUsize::new(8).unwrap());
        assert_eq!(merged.log_level, "info"); // CLI left at default
    }

    #[test]
    fn test_count_only_conflicts_with_field_flags() {
        let config = SearchConfig {
            count_only: true,
            show_lines: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SearchConfig {
            count_only: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_record_builder_reflects_flags() {
        let config = SearchConfig {
            show_line_numbers: true,
            show_pattern: true,
            ..Default::default()
        };
        let builder = config.record_builder();
        assert!(builder.show_line_numbers);
        assert!(!builder.show_lines);
        assert!(!builder.show_source);
        assert!(builder.show_pattern);
    }
}
