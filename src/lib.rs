// src/lib.rs
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod footer;
pub mod presets;
pub mod reader;
pub mod sections;
pub mod select;
pub mod store;

pub use error::*;

pub use commands::{PipeOptions, ShowOptions};
pub use config::GlanceConfig;
pub use filter::FilterMatcher;
pub use footer::{Footer, FooterLabel};
pub use presets::{Preset, PresetStore};
pub use reader::LineReader;
pub use select::replay::{Around, LineRange, ReplaySelector, WindowSpec};
pub use select::ring::{TailBuffer, TailEntry};
pub use select::stream::StreamSelector;
pub use select::Selection;
pub use store::{Capture, CaptureStore, CaptureWriter};
