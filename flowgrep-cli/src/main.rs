use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use flowgrep::{search, MatchRecord, SearchConfig, SearchReport};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Concurrent line-oriented pattern search
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pattern to search for (can be specified multiple times)
    #[arg(short = 'p', long = "pattern")]
    patterns: Vec<String>,

    /// File to search (one file is chunked; several run whole-file)
    #[arg(short = 'f', long = "file")]
    files: Vec<PathBuf>,

    /// Recursively add files under the root directory
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Root directory for recursive enumeration
    #[arg(short = 'd', long, default_value = ".")]
    root: PathBuf,

    /// File-name suffixes to skip (e.g. .log)
    #[arg(long = "ignore-ext")]
    ignore_extensions: Vec<String>,

    /// Show line numbers
    #[arg(short = 'n', long)]
    line_numbers: bool,

    /// Show the matched text (or the whole line when inverted)
    #[arg(short = 'l', long)]
    lines: bool,

    /// Show the source file of each match
    #[arg(long = "show-source")]
    show_source: bool,

    /// Show the pattern that matched
    #[arg(long = "show-pattern")]
    show_pattern: bool,

    /// Case-insensitive matching
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Invert the match: report lines a pattern fails to match
    #[arg(short = 'v', long)]
    invert: bool,

    /// Print only the total match count
    #[arg(short = 'c', long)]
    count: bool,

    /// Number of producer threads
    #[arg(long)]
    producers: Option<NonZeroUsize>,

    /// Number of consumer threads
    #[arg(long)]
    consumers: Option<NonZeroUsize>,

    /// Line queue capacity (unbounded if omitted)
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> Result<SearchConfig> {
        let defaults = SearchConfig::default();
        let cli_config = SearchConfig {
            patterns: self.patterns,
            files: self.files,
            root_path: self.root,
            recursive: self.recursive,
            ignore_extensions: self.ignore_extensions,
            case_insensitive: self.ignore_case,
            invert_match: self.invert,
            count_only: self.count,
            show_line_numbers: self.line_numbers,
            show_lines: self.lines,
            show_source: self.show_source,
            show_pattern: self.show_pattern,
            producer_threads: self.producers.unwrap_or(defaults.producer_threads),
            consumer_threads: self.consumers.unwrap_or(defaults.consumer_threads),
            queue_capacity: self.queue_capacity,
            log_level: self.log_level,
        };

        let file_config = SearchConfig::load_from(self.config.as_deref())?;
        Ok(file_config.merge_with_cli(cli_config))
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_record(record: &MatchRecord) -> String {
    let mut parts = Vec::new();
    if let Some(source) = &record.source {
        parts.push(source.display().to_string().blue().to_string());
    }
    if let Some(line_number) = record.line_number {
        parts.push(line_number.to_string().green().to_string());
    }
    if let Some(text) = &record.text {
        parts.push(text.clone());
    }
    let mut line = parts.join(":");
    if let Some(pattern) = &record.pattern {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&format!("[{}]", pattern).dimmed().to_string());
    }
    line
}

fn print_report(report: &SearchReport, count_only: bool) {
    if !count_only {
        for record in &report.records {
            println!("{}", format_record(record));
        }
    }
    println!(
        "{}",
        format!("Total matches found: {}", report.total_matches).green()
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.into_config()?;
    init_tracing(&config.log_level);

    let started = Instant::now();
    let report = search(&config)?;
    let elapsed = started.elapsed();

    print_report(&report, config.count_only);
    eprintln!(
        "{}",
        format!("search took {} ms", elapsed.as_millis()).yellow()
    );
    Ok(())
}
