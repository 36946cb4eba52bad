// src/select/stream.rs
use std::io::{self, Write};

use tracing::trace;

use crate::error::ConfigError;
use crate::filter::FilterMatcher;
use crate::select::ring::{TailBuffer, TailEntry};
use crate::select::{write_line, Selection};

/// Default number of head and tail lines in pipe mode.
pub const DEFAULT_HEAD_TAIL: usize = 10;

/// Single-pass selector for streams of unknown length.
///
/// Shows the first `head_tail` lines, every filter match in between and the
/// last `head_tail` lines, holding at most `head_tail` lines in memory.
pub struct StreamSelector<'a> {
    head_tail: usize,
    matcher: &'a FilterMatcher,
}

impl<'a> StreamSelector<'a> {
    pub fn new(head_tail: usize, matcher: &'a FilterMatcher) -> Result<Self, ConfigError> {
        if head_tail == 0 {
            return Err(ConfigError::InvalidArgument(
                "-n must be a positive integer".to_string(),
            ));
        }
        Ok(StreamSelector { head_tail, matcher })
    }

    /// Consume `lines`, writing selected lines to `out` as soon as they are
    /// known to be shown.
    ///
    /// A read error aborts the pass; whatever was already written stays
    /// written, but no `Selection` is returned.
    pub fn select<I, W>(&self, lines: I, out: &mut W) -> io::Result<Selection>
    where
        I: IntoIterator<Item = io::Result<String>>,
        W: Write,
    {
        let mut selection = Selection::default();
        let mut tail = TailBuffer::new(self.head_tail);

        for line in lines {
            let text = line?;
            selection.total_lines += 1;
            let line_number = selection.total_lines;

            if line_number <= self.head_tail {
                emit(&mut selection, out, line_number, &text)?;
                continue;
            }

            let matched = self.matcher.is_match(&text);
            if let Some(evicted) = tail.push(TailEntry::new(line_number, text, matched)) {
                if evicted.matched {
                    emit(&mut selection, out, evicted.line_number, &evicted.text)?;
                } else {
                    trace!(line = evicted.line_number, "dropped middle line");
                }
            }
        }

        for entry in tail.drain() {
            emit(&mut selection, out, entry.line_number, &entry.text)?;
        }

        Ok(selection)
    }
}

fn emit<W: Write>(selection: &mut Selection, out: &mut W, line_number: usize, text: &str) -> io::Result<()> {
    if selection.mark_printed(line_number) {
        write_line(out, line_number, 0, text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(total: usize) -> Vec<io::Result<String>> {
        (1..=total).map(|n| Ok(n.to_string())).collect()
    }

    fn run(lines: Vec<io::Result<String>>, n: usize, matcher: &FilterMatcher) -> (Selection, String) {
        let selector = StreamSelector::new(n, matcher).unwrap();
        let mut out = Vec::new();
        let selection = selector.select(lines, &mut out).unwrap();
        (selection, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_zero_head_tail_rejected() {
        let matcher = FilterMatcher::none();
        assert!(StreamSelector::new(0, &matcher).is_err());
    }

    #[test]
    fn test_empty_input() {
        let (selection, out) = run(Vec::new(), 10, &FilterMatcher::none());
        assert_eq!(selection.total_lines, 0);
        assert!(selection.printed.is_empty());
        assert_eq!(out, "");
    }

    #[test]
    fn test_short_streams_show_everything_once() {
        let matcher = FilterMatcher::none();
        for n in 1..=4 {
            for total in 0..=2 * n {
                let (selection, _) = run(numbered(total), n, &matcher);
                let expected: Vec<usize> = (1..=total).collect();
                assert_eq!(selection.printed, expected, "n={} total={}", n, total);
                assert_eq!(selection.total_lines, total);
            }
        }
    }

    #[test]
    fn test_long_streams_show_head_and_tail() {
        let matcher = FilterMatcher::none();
        for n in 1..=4 {
            for total in (2 * n + 1)..=(2 * n + 7) {
                let (selection, _) = run(numbered(total), n, &matcher);
                let expected: Vec<usize> = (1..=n).chain(total - n + 1..=total).collect();
                assert_eq!(selection.printed, expected, "n={} total={}", n, total);
            }
        }
    }

    #[test]
    fn test_output_format_and_order() {
        let (_, out) = run(numbered(500), 2, &FilterMatcher::none());
        assert_eq!(out, "1: 1\n2: 2\n499: 499\n500: 500\n");
    }

    #[test]
    fn test_middle_match_shown_once() {
        let matcher = FilterMatcher::compile(&["^MATCH"]).unwrap();
        let mut lines = numbered(100);
        lines.push(Ok("MATCH here".to_string()));
        lines.extend(numbered(200));

        let (selection, out) = run(lines, 10, &matcher);
        assert_eq!(out.matches("101: MATCH here\n").count(), 1);
        assert_eq!(selection.total_lines, 301);
        assert_eq!(selection.printed.len(), 21);
        assert!(selection.printed.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_match_inside_tail_not_duplicated() {
        // the match is still buffered when the stream ends
        let matcher = FilterMatcher::compile(&["needle"]).unwrap();
        let mut lines = numbered(20);
        lines.push(Ok("needle".to_string()));
        lines.extend(numbered(1));

        let (selection, out) = run(lines, 3, &matcher);
        assert_eq!(out.matches("needle").count(), 1);
        assert_eq!(selection.printed, vec![1, 2, 3, 20, 21, 22]);
    }

    #[test]
    fn test_head_line_matching_filter_not_duplicated() {
        let matcher = FilterMatcher::compile(&["^1$"]).unwrap();
        let (selection, out) = run(numbered(100), 5, &matcher);
        assert_eq!(out.matches("1: 1\n").count(), 1);
        assert_eq!(selection.printed, vec![1, 2, 3, 4, 5, 96, 97, 98, 99, 100]);
    }

    #[test]
    fn test_matches_at_every_distance_from_eviction() {
        let matcher = FilterMatcher::compile(&["^x"]).unwrap();
        let n = 3;
        for position in n + 1..=30 - n {
            let lines: Vec<io::Result<String>> = (1..=30)
                .map(|i| Ok(if i == position { format!("x{}", i) } else { i.to_string() }))
                .collect();
            let (selection, _) = run(lines, n, &matcher);
            let count = selection.printed.iter().filter(|&&l| l == position).count();
            assert_eq!(count, 1, "match at {}", position);
        }
    }

    #[test]
    fn test_read_error_aborts() {
        let matcher = FilterMatcher::none();
        let selector = StreamSelector::new(2, &matcher).unwrap();
        let lines = vec![
            Ok("one".to_string()),
            Ok("two".to_string()),
            Ok("three".to_string()),
            Err(io::Error::new(io::ErrorKind::Other, "boom")),
            Ok("never".to_string()),
        ];
        let mut out = Vec::new();
        let err = selector.select(lines, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "boom");
        // head lines already went out; the buffered line never did
        assert_eq!(String::from_utf8(out).unwrap(), "1: one\n2: two\n");
    }

    #[test]
    fn test_large_head_tail_on_small_input() {
        let (selection, _) = run(numbered(7), 1_000, &FilterMatcher::none());
        assert_eq!(selection.printed, (1..=7).collect::<Vec<_>>());
    }
}
