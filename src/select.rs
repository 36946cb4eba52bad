// src/select.rs
pub mod replay;
pub mod ring;
pub mod stream;

use std::io::{self, Write};

use crate::footer::{Footer, FooterLabel};

/// Outcome of one selection pass: how many lines the input had and which
/// of them were written, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub total_lines: usize,
    pub printed: Vec<usize>,
}

impl Selection {
    /// Record `line_number` as printed unless it already was.
    ///
    /// Emission is always in ascending order, so comparing against the last
    /// printed number is a complete membership check.
    fn mark_printed(&mut self, line_number: usize) -> bool {
        match self.printed.last() {
            Some(&last) if last >= line_number => false,
            _ => {
                self.printed.push(line_number);
                true
            }
        }
    }

    pub fn footer(&self, label: FooterLabel) -> Footer {
        Footer::new(label, self.total_lines, &self.printed)
    }
}

fn write_line<W: Write>(out: &mut W, line_number: usize, width: usize, text: &str) -> io::Result<()> {
    writeln!(out, "{:>width$}: {}", line_number, text, width = width)
}

/// Number of decimal digits in `n` (at least 1).
pub fn digit_width(n: usize) -> usize {
    n.to_string().len()
}
