use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::ConfigError;

/// Case-insensitive OR of every configured filter pattern.
///
/// An empty filter set compiles to a matcher that never matches and never
/// touches the regex engine.
#[derive(Debug, Clone, Default)]
pub struct FilterMatcher {
    regex: Option<Regex>,
}

impl FilterMatcher {
    /// Joins `patterns` with `|` and compiles the result case-insensitively.
    ///
    /// Fails on the combined pattern, so the error names exactly what the
    /// regex engine saw.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let combined = join_patterns(patterns);
        if combined.is_empty() {
            return Ok(Self::none());
        }

        let regex = RegexBuilder::new(&combined)
            .case_insensitive(true)
            .build()
            .map_err(|source| ConfigError::InvalidRegex {
                pattern: combined.clone(),
                source,
            })?;

        debug!(pattern = %combined, "compiled filter");
        Ok(FilterMatcher { regex: Some(regex) })
    }

    /// A matcher that matches nothing.
    pub fn none() -> Self {
        FilterMatcher { regex: None }
    }

    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    pub fn is_match(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => false,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(Regex::as_str)
    }
}

fn join_patterns<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("|")
}
