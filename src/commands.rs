//! The user-facing operations, independent of argument parsing.

use std::io::{BufRead, Write};

use chrono::Utc;
use tracing::debug;

use crate::config::GlanceConfig;
use crate::error::GlanceError;
use crate::filter::FilterMatcher;
use crate::footer::{Footer, FooterLabel};
use crate::presets::{PresetStore, BUILTIN_PRESETS};
use crate::reader::LineReader;
use crate::select::replay::{dump, Around, LineRange, ReplaySelector, WindowSpec};
use crate::select::stream::{StreamSelector, DEFAULT_HEAD_TAIL};
use crate::store::{format_age, CaptureStore};

#[derive(Debug, Clone)]
pub struct PipeOptions {
    pub head_tail: usize,
    pub filters: Vec<String>,
    pub presets: Vec<String>,
    pub no_store: bool,
}

impl Default for PipeOptions {
    fn default() -> Self {
        PipeOptions {
            head_tail: DEFAULT_HEAD_TAIL,
            filters: Vec::new(),
            presets: Vec::new(),
            no_store: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    pub id: String,
    pub ranges: Vec<LineRange>,
    pub around: Vec<Around>,
    pub filters: Vec<String>,
    pub presets: Vec<String>,
}

fn compile_filters(
    config: &GlanceConfig,
    filters: &[String],
    presets: &[String],
) -> Result<FilterMatcher, GlanceError> {
    let patterns = PresetStore::new(config.presets_path()).expand_filters(filters, presets)?;
    Ok(FilterMatcher::compile(&patterns)?)
}

/// Summarize `input` to `out`, storing a full copy unless `no_store` is set.
///
/// Every argument is validated before the first byte of input is read. On a
/// read error the footer is not written and no capture is kept.
pub fn run_pipe<R: BufRead, W: Write>(
    config: &GlanceConfig,
    opts: &PipeOptions,
    input: R,
    out: &mut W,
) -> Result<Footer, GlanceError> {
    let matcher = compile_filters(config, &opts.filters, &opts.presets)?;
    let selector = StreamSelector::new(opts.head_tail, &matcher)?;

    let mut capture = if opts.no_store {
        None
    } else {
        Some(CaptureStore::new(&config.cache_dir).create(config.buffer_size)?)
    };

    let selection = match capture.as_mut() {
        Some(writer) => selector.select(LineReader::mirrored(input, writer), out)?,
        None => selector.select(LineReader::new(input), out)?,
    };

    let label = match capture {
        Some(writer) => FooterLabel::Stored(writer.commit()?),
        None => FooterLabel::Unstored,
    };
    let footer = selection.footer(label);
    writeln!(out, "{}", footer)?;
    out.flush()?;

    debug!(
        total = footer.total(),
        shown = footer.shown(),
        "pipe finished"
    );
    Ok(footer)
}

/// Replay a stored capture. Returns `None` when the capture was dumped
/// verbatim because no window or filter was given.
pub fn run_show<W: Write>(
    config: &GlanceConfig,
    opts: &ShowOptions,
    out: &mut W,
) -> Result<Option<Footer>, GlanceError> {
    let matcher = compile_filters(config, &opts.filters, &opts.presets)?;
    let window = WindowSpec {
        ranges: opts.ranges.clone(),
        around: opts.around.clone(),
    };
    let capture = CaptureStore::new(&config.cache_dir).open(&opts.id)?;
    let selector = ReplaySelector::new(&window, &matcher);

    if selector.is_passthrough() {
        dump(capture.reader(config.buffer_size)?, out)?;
        out.flush()?;
        return Ok(None);
    }

    let lines = LineReader::new(capture.reader(config.buffer_size)?);
    let selection = selector.select(lines, capture.total_lines, out)?;
    let footer = selection.footer(FooterLabel::Show(capture.id.clone()));
    writeln!(out, "{}", footer)?;
    out.flush()?;
    Ok(Some(footer))
}

pub fn run_list<W: Write>(config: &GlanceConfig, out: &mut W) -> Result<(), GlanceError> {
    let captures = CaptureStore::new(&config.cache_dir).list()?;
    if captures.is_empty() {
        writeln!(out, "No stored captures.")?;
        return Ok(());
    }

    let now = Utc::now();
    for capture in &captures {
        writeln!(
            out,
            "{}\t{} lines\t{}",
            capture.id,
            capture.lines,
            format_age(capture.age_secs(now))
        )?;
    }
    Ok(())
}

pub fn run_clean<W: Write>(config: &GlanceConfig, all: bool, out: &mut W) -> Result<(), GlanceError> {
    CaptureStore::new(&config.cache_dir).clean()?;
    if all {
        PresetStore::new(config.presets_path()).purge()?;
        writeln!(out, "Purged all captures and user presets.")?;
    } else {
        writeln!(out, "Purged all captures.")?;
    }
    Ok(())
}

pub fn run_presets_list<W: Write>(config: &GlanceConfig, out: &mut W) -> Result<(), GlanceError> {
    writeln!(out, "Built-in presets:")?;
    for preset in BUILTIN_PRESETS.iter() {
        writeln!(out, "  {:<10}  {:<50}  {}", preset.name, preset.regex, preset.description)?;
    }

    let user = PresetStore::new(config.presets_path()).user_presets()?;
    if !user.is_empty() {
        writeln!(out)?;
        writeln!(out, "User presets:")?;
        for preset in &user {
            writeln!(out, "  {:<10}  {:<50}  {}", preset.name, preset.regex, preset.description)?;
        }
    }
    Ok(())
}

pub fn run_presets_add<W: Write>(
    config: &GlanceConfig,
    name: &str,
    regex: &str,
    description: &str,
    delimiter: Option<&str>,
    out: &mut W,
) -> Result<(), GlanceError> {
    PresetStore::new(config.presets_path()).add(name, regex, description, delimiter)?;
    writeln!(out, "Added preset: {}", name)?;
    Ok(())
}

pub fn run_presets_remove<W: Write>(config: &GlanceConfig, name: &str, out: &mut W) -> Result<(), GlanceError> {
    PresetStore::new(config.presets_path()).remove(name)?;
    writeln!(out, "Removed preset: {}", name)?;
    Ok(())
}
