use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::warn;

use crate::errors::{SearchError, SearchResult};

/// An immutable, ordered collection of compiled matchers.
///
/// Case sensitivity is baked in at construction; callers never re-flag
/// individual patterns afterwards. Patterns that fail to compile are
/// reported and skipped so one bad pattern does not sink the job.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Arc<[Regex]>,
}

impl PatternSet {
    /// Compiles `patterns`, skipping any that are invalid.
    ///
    /// Returns `EmptyPatternSet` when nothing survives compilation.
    pub fn compile(patterns: &[String], case_insensitive: bool) -> SearchResult<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            match RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
            {
                Ok(re) => compiled.push(re),
                Err(e) => {
                    warn!("ignoring invalid pattern `{}`: {}", pattern, e);
                }
            }
        }

        if compiled.is_empty() {
            return Err(SearchError::EmptyPatternSet);
        }

        Ok(Self {
            patterns: compiled.into(),
        })
    }

    /// Compiles a single pattern, failing instead of skipping on error.
    pub fn compile_strict(pattern: &str, case_insensitive: bool) -> SearchResult<Self> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| SearchError::invalid_pattern(pattern, e))?;
        Ok(Self {
            patterns: vec![re].into(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Regex> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
