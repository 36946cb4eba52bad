use std::env;
use std::path::{Path, PathBuf};

use crate::error::GlanceError;

const APP_DIR: &str = "glance";
const PRESETS_FILE: &str = "presets.conf";

/// Where captures and user presets live, plus I/O tuning.
#[derive(Debug, Clone)]
pub struct GlanceConfig {
    pub cache_dir: PathBuf,
    pub config_dir: PathBuf,
    pub buffer_size: usize,
}

impl GlanceConfig {
    /// Resolve directories from `XDG_CACHE_HOME` / `XDG_CONFIG_HOME`,
    /// falling back to the platform defaults.
    pub fn from_env() -> Result<Self, GlanceError> {
        let cache_root = xdg_dir("XDG_CACHE_HOME")
            .or_else(dirs::cache_dir)
            .ok_or_else(|| missing_dir("cache"))?;
        let config_root = xdg_dir("XDG_CONFIG_HOME")
            .or_else(dirs::config_dir)
            .ok_or_else(|| missing_dir("config"))?;

        Ok(Self::with_roots(&cache_root, &config_root))
    }

    /// Config rooted at explicit cache and config base directories.
    pub fn with_roots(cache_root: &Path, config_root: &Path) -> Self {
        GlanceConfig {
            cache_dir: cache_root.join(APP_DIR).join("captures"),
            config_dir: config_root.join(APP_DIR),
            ..Default::default()
        }
    }

    pub fn presets_path(&self) -> PathBuf {
        self.config_dir.join(PRESETS_FILE)
    }
}

impl Default for GlanceConfig {
    fn default() -> Self {
        GlanceConfig {
            cache_dir: PathBuf::from(APP_DIR).join("captures"),
            config_dir: PathBuf::from(APP_DIR),
            buffer_size: 65536, // 64KB
        }
    }
}

fn xdg_dir(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn missing_dir(kind: &str) -> GlanceError {
    GlanceError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("could not determine {} directory", kind),
    ))
}
