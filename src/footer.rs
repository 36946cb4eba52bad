use std::fmt;

use crate::sections;

/// What a footer is summarizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FooterLabel {
    /// Live run whose input was stored under this capture id.
    Stored(String),
    /// Live run with `--no-store`.
    Unstored,
    /// Replay of a stored capture.
    Show(String),
}

/// The trailing summary line. Built once, after the input is exhausted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    label: FooterLabel,
    total: usize,
    shown: usize,
    sections: String,
}

impl Footer {
    pub fn new(label: FooterLabel, total: usize, printed: &[usize]) -> Self {
        let sections = sections::compress(printed);
        // count the same deduplicated set that compress() describes
        let mut distinct = printed.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        let shown = distinct.len();
        Footer {
            label,
            total,
            shown,
            sections,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn sections(&self) -> &str {
        &self.sections
    }
}

impl fmt::Display for Footer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            FooterLabel::Stored(id) => write!(f, "--- glance id={}", id)?,
            FooterLabel::Unstored => write!(f, "--- glance")?,
            FooterLabel::Show(id) => write!(f, "--- glance show {}", id)?,
        }
        write!(f, " | {} | showing {}", plural_lines(self.total), self.shown)?;
        if self.shown > 0 {
            write!(f, " | sections: {}", self.sections)?;
        }
        write!(f, " ---")
    }
}

pub fn plural_lines(n: usize) -> String {
    if n == 1 {
        "1 line".to_string()
    } else {
        format!("{} lines", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_lines() {
        assert_eq!(plural_lines(0), "0 lines");
        assert_eq!(plural_lines(1), "1 line");
        assert_eq!(plural_lines(2), "2 lines");
        assert_eq!(plural_lines(1000), "1000 lines");
    }

    #[test]
    fn test_stored_footer() {
        let footer = Footer::new(
            FooterLabel::Stored("20260219-143022-a3f8b1c0".to_string()),
            500,
            &[1, 2, 3, 498, 499, 500],
        );
        assert_eq!(
            footer.to_string(),
            "--- glance id=20260219-143022-a3f8b1c0 | 500 lines | showing 6 | sections: 1-3, 498-500 ---"
        );
    }

    #[test]
    fn test_zero_lines() {
        let footer = Footer::new(FooterLabel::Unstored, 0, &[]);
        assert_eq!(footer.to_string(), "--- glance | 0 lines | showing 0 ---");
        assert_eq!(footer.sections(), "");
    }

    #[test]
    fn test_show_footer_single_line() {
        let footer = Footer::new(FooterLabel::Show("abc".to_string()), 1, &[1]);
        assert_eq!(
            footer.to_string(),
            "--- glance show abc | 1 line | showing 1 | sections: 1 ---"
        );
    }

    #[test]
    fn test_nothing_shown_omits_sections() {
        let footer = Footer::new(FooterLabel::Show("abc".to_string()), 40, &[]);
        assert_eq!(
            footer.to_string(),
            "--- glance show abc | 40 lines | showing 0 ---"
        );
    }
}
