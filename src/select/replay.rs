// src/select/replay.rs
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::str::FromStr;

use tracing::debug;

use crate::error::ConfigError;
use crate::filter::FilterMatcher;
use crate::select::{digit_width, write_line, Selection};

/// Context used by `--around LINE` when none is given.
pub const DEFAULT_AROUND_CONTEXT: usize = 5;

/// Inclusive `start-end` line range, both ends positive. A range whose start
/// lies past its end is accepted and selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidArgument("invalid range, must be N-M".to_string());

        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = parse_positive(start).ok_or_else(invalid)?;
        let end = parse_positive(end).ok_or_else(invalid)?;
        Ok(LineRange { start, end })
    }
}

/// `center` plus `context` lines on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Around {
    pub center: usize,
    pub context: usize,
}

impl Around {
    /// First and last line of the window; the lower bound never goes below 1.
    pub fn bounds(&self) -> (usize, usize) {
        (
            self.center.saturating_sub(self.context).max(1),
            self.center.saturating_add(self.context),
        )
    }
}

impl FromStr for Around {
    type Err = ConfigError;

    /// Accepts `LINE` or `LINE:CONTEXT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (center, context) = match s.split_once(':') {
            Some((center, context)) => (center, Some(context)),
            None => (s, None),
        };

        let center = parse_positive(center).ok_or_else(|| {
            ConfigError::InvalidArgument("--around center must be a positive integer".to_string())
        })?;
        let context = match context {
            Some(context) => context.trim().parse::<usize>().map_err(|_| {
                ConfigError::InvalidArgument(
                    "--around context must be a non-negative integer".to_string(),
                )
            })?,
            None => DEFAULT_AROUND_CONTEXT,
        };

        Ok(Around { center, context })
    }
}

fn parse_positive(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok().filter(|&n| n > 0)
}

/// Which lines of a stored capture to show regardless of filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSpec {
    pub ranges: Vec<LineRange>,
    pub around: Vec<Around>,
}

impl WindowSpec {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.around.is_empty()
    }

    /// Union of every range and around-window, limited to `1..=total_lines`.
    fn membership(&self, total_lines: usize) -> BTreeSet<usize> {
        let windows = self
            .ranges
            .iter()
            .map(|r| (r.start, r.end))
            .chain(self.around.iter().map(Around::bounds));

        let mut lines = BTreeSet::new();
        for (start, end) in windows {
            let end = end.min(total_lines);
            if start <= end {
                lines.extend(start..=end);
            }
        }
        lines
    }
}

/// Selector over a finite, stored stream whose length is known up front.
pub struct ReplaySelector<'a> {
    window: &'a WindowSpec,
    matcher: &'a FilterMatcher,
}

impl<'a> ReplaySelector<'a> {
    pub fn new(window: &'a WindowSpec, matcher: &'a FilterMatcher) -> Self {
        ReplaySelector { window, matcher }
    }

    /// True when neither windows nor filters were requested; callers should
    /// dump the capture verbatim instead of selecting.
    pub fn is_passthrough(&self) -> bool {
        self.window.is_empty() && self.matcher.is_empty()
    }

    /// Emit, in one pass, every line that lies in a requested window or
    /// matches the filter. Line numbers are right-aligned to the widest
    /// number that can be shown.
    pub fn select<I, W>(&self, lines: I, total_lines: usize, out: &mut W) -> io::Result<Selection>
    where
        I: IntoIterator<Item = io::Result<String>>,
        W: Write,
    {
        let membership = self.window.membership(total_lines);
        let widest = if self.matcher.is_empty() {
            membership.last().copied().unwrap_or(0)
        } else {
            total_lines
        };
        let width = digit_width(widest);
        debug!(
            total_lines,
            windowed = membership.len(),
            filtered = !self.matcher.is_empty(),
            "replaying capture"
        );

        let mut selection = Selection {
            total_lines,
            printed: Vec::new(),
        };
        for (index, line) in lines.into_iter().enumerate() {
            let text = line?;
            let line_number = index + 1;
            if line_number > total_lines {
                break;
            }

            let shown = membership.contains(&line_number) || self.matcher.is_match(&text);
            if shown && selection.mark_printed(line_number) {
                write_line(out, line_number, width, &text)?;
            }
        }

        Ok(selection)
    }
}

/// Copy a capture through untouched.
pub fn dump<R: io::Read, W: Write>(mut input: R, out: &mut W) -> io::Result<u64> {
    io::copy(&mut input, out)
}
