use std::fs;
use std::io;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, GlanceError};
use crate::filter::FilterMatcher;

/// A named filter pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub regex: String,
    pub description: String,
}

impl Preset {
    fn builtin(name: &str, regex: &str, description: &str) -> Self {
        Preset {
            name: name.to_string(),
            regex: regex.to_string(),
            description: description.to_string(),
        }
    }
}

pub static BUILTIN_PRESETS: Lazy<Vec<Preset>> = Lazy::new(|| {
    vec![
        Preset::builtin(
            "errors",
            "error|err|fail|fatal|panic|exception|traceback",
            "Error detection",
        ),
        Preset::builtin("warnings", "warn|warning|deprecated", "Warnings"),
        Preset::builtin(
            "status",
            r"exit code|status|returned?\s+[0-9]+|HTTP\s+[45][0-9][0-9]",
            "Status/exit codes",
        ),
    ]
});

static PRESET_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").expect("preset name regex"));

/// Delimiters tried in order when the user does not pick one.
const CANDIDATE_DELIMITERS: [char; 7] = ['/', ',', '@', '#', '%', '~', '!'];

pub fn builtin(name: &str) -> Option<&'static Preset> {
    BUILTIN_PRESETS.iter().find(|p| p.name == name)
}

pub fn is_valid_name(name: &str) -> bool {
    PRESET_NAME.is_match(name)
}

/// Parse a sed-style preset line: the first character is the delimiter,
/// then `name<d>regex[<d>description]`. The description may itself contain
/// the delimiter.
pub fn parse_line(line: &str) -> Option<Preset> {
    let mut chars = line.chars();
    let delim = chars.next()?;
    let rest = chars.as_str();

    let mut parts = rest.splitn(3, delim);
    let name = parts.next()?;
    let regex = parts.next()?;
    let description = parts.next().unwrap_or("");

    Some(Preset {
        name: name.to_string(),
        regex: regex.to_string(),
        description: description.to_string(),
    })
}

fn is_passive(line: &str) -> bool {
    line.is_empty() || line.starts_with('#')
}

/// Built-in presets plus the user's presets file.
#[derive(Debug, Clone)]
pub struct PresetStore {
    path: PathBuf,
}

impl PresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PresetStore { path: path.into() }
    }

    /// Look up a preset's regex, built-ins first.
    pub fn resolve(&self, name: &str) -> Result<String, GlanceError> {
        if let Some(preset) = builtin(name) {
            return Ok(preset.regex.clone());
        }
        self.user_presets()?
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.regex)
            .ok_or_else(|| GlanceError::UnknownPreset(name.to_string()))
    }

    /// Expand `-p` names into patterns, appended after the literal filters.
    pub fn expand_filters(&self, filters: &[String], presets: &[String]) -> Result<Vec<String>, GlanceError> {
        let mut patterns = filters.to_vec();
        for name in presets {
            patterns.push(self.resolve(name)?);
        }
        Ok(patterns)
    }

    pub fn user_presets(&self) -> Result<Vec<Preset>, GlanceError> {
        Ok(self
            .read_lines()?
            .iter()
            .filter(|l| !is_passive(l))
            .filter_map(|l| parse_line(l))
            .collect())
    }

    /// Add or replace a user preset. Returns the delimiter that was used.
    pub fn add(
        &self,
        name: &str,
        regex: &str,
        description: &str,
        delimiter: Option<&str>,
    ) -> Result<char, GlanceError> {
        if !is_valid_name(name) {
            return Err(ConfigError::InvalidPresetName(name.to_string()).into());
        }
        if builtin(name).is_some() {
            return Err(ConfigError::BuiltinPreset {
                name: name.to_string(),
                action: "override",
            }
            .into());
        }
        FilterMatcher::compile(&[regex])?;
        let delim = pick_delimiter(regex, delimiter)?;

        let mut lines: Vec<String> = self
            .read_lines()?
            .into_iter()
            .filter(|l| is_passive(l) || parse_line(l).is_some_and(|p| p.name != name))
            .collect();
        lines.push(format!("{d}{}{d}{}{d}{}", name, regex, description, d = delim));

        self.write_lines(&lines)?;
        debug!(name, delimiter = %delim, path = %self.path.display(), "preset added");
        Ok(delim)
    }

    pub fn remove(&self, name: &str) -> Result<(), GlanceError> {
        if builtin(name).is_some() {
            return Err(ConfigError::BuiltinPreset {
                name: name.to_string(),
                action: "remove",
            }
            .into());
        }

        let lines = self.read_lines()?;
        let before = lines.len();
        let kept: Vec<String> = lines
            .into_iter()
            .filter(|l| is_passive(l) || parse_line(l).map_or(true, |p| p.name != name))
            .collect();
        if kept.len() == before {
            return Err(GlanceError::PresetNotFound(name.to_string()));
        }

        self.write_lines(&kept)?;
        debug!(name, path = %self.path.display(), "preset removed");
        Ok(())
    }

    /// Delete the presets file entirely.
    pub fn purge(&self) -> Result<(), GlanceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn read_lines(&self) -> Result<Vec<String>, GlanceError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), GlanceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&self.path, content)?;
        Ok(())
    }
}

fn pick_delimiter(regex: &str, requested: Option<&str>) -> Result<char, ConfigError> {
    if let Some(requested) = requested {
        let mut chars = requested.chars();
        let delim = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => {
                return Err(ConfigError::InvalidArgument(format!(
                    "delimiter must be a single character: {}",
                    requested
                )))
            }
        };
        if regex.contains(delim) {
            return Err(ConfigError::DelimiterConflict(delim.to_string()));
        }
        return Ok(delim);
    }

    CANDIDATE_DELIMITERS
        .iter()
        .copied()
        .find(|&c| !regex.contains(c))
        .ok_or(ConfigError::DelimiterExhausted)
}
