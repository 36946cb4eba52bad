/// Problems with the shape of the arguments. Always detected before any
/// input is read or any capture is written.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid regex {pattern}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0}")]
    InvalidArgument(String),

    #[error("invalid capture ID: {0}")]
    InvalidCaptureId(String),

    #[error("invalid preset name: {0} (must start with alphanumeric, use only alphanumeric/hyphens/underscores)")]
    InvalidPresetName(String),

    #[error("cannot {action} built-in preset: {name}")]
    BuiltinPreset { name: String, action: &'static str },

    #[error("delimiter {0} appears in regex, choose another")]
    DelimiterConflict(String),

    #[error("regex contains all candidate delimiters, use -d to specify one")]
    DelimiterExhausted,
}

#[derive(Debug, thiserror::Error)]
pub enum GlanceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("capture not found: {0}")]
    CaptureNotFound(String),

    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    #[error("preset not found: {0}")]
    PresetNotFound(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used at the process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    NotFound,
    Io,
}

impl GlanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GlanceError::Config(_) => ErrorKind::Config,
            GlanceError::CaptureNotFound(_)
            | GlanceError::UnknownPreset(_)
            | GlanceError::PresetNotFound(_) => ErrorKind::NotFound,
            GlanceError::Io(_) => ErrorKind::Io,
        }
    }

    /// Follow-up advice printed after the message, for lookups that failed.
    pub fn hint(&self) -> Option<&'static str> {
        if self.kind() != ErrorKind::NotFound {
            return None;
        }
        match self {
            GlanceError::CaptureNotFound(_) => Some("Use \"glance list\" to see stored captures."),
            _ => Some("Use \"glance presets list\" to see available presets."),
        }
    }

    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, GlanceError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe)
    }
}

pub type Result<T> = std::result::Result<T, GlanceError>;
