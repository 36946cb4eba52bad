use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConfigError, GlanceError};
use crate::reader::count_lines;

const CAPTURE_EXT: &str = "txt";

/// Directory of stored captures, one `<id>.txt` file each.
#[derive(Debug, Clone)]
pub struct CaptureStore {
    dir: PathBuf,
}

impl CaptureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        CaptureStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `YYYYMMDD-HHMMSS-xxxxxxxx`: local time plus 32 random bits.
    pub fn generate_id() -> String {
        format!(
            "{}-{:08x}",
            Local::now().format("%Y%m%d-%H%M%S"),
            rand::random::<u32>()
        )
    }

    /// Start a new capture. Nothing is visible under the returned id until
    /// `CaptureWriter::commit` succeeds.
    pub fn create(&self, buffer_size: usize) -> Result<CaptureWriter, GlanceError> {
        fs::create_dir_all(&self.dir)?;
        let id = Self::generate_id();
        let path = self.capture_path(&id);
        let file = NamedTempFile::new_in(&self.dir)?;
        debug!(id = %id, temp = %file.path().display(), "capture started");

        Ok(CaptureWriter {
            id,
            path,
            file: BufWriter::with_capacity(buffer_size, file),
        })
    }

    pub fn open(&self, id: &str) -> Result<Capture, GlanceError> {
        validate_id(id)?;
        let path = self.capture_path(id);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(GlanceError::CaptureNotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let total_lines = count_lines(BufReader::new(file))?;

        Ok(Capture {
            id: id.to_string(),
            path,
            total_lines,
        })
    }

    /// Every stored capture, oldest first.
    pub fn list(&self) -> Result<Vec<CaptureInfo>, GlanceError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut captures = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(CAPTURE_EXT)
            {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            captures.push(CaptureInfo {
                id: id.to_string(),
                lines: count_lines(BufReader::new(File::open(&path)?))?,
                modified: entry.metadata().and_then(|m| m.modified()).ok(),
            });
        }

        // ids start with a timestamp, so name order is age order
        captures.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(captures)
    }

    /// Delete every capture.
    pub fn clean(&self) -> Result<(), GlanceError> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn capture_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, CAPTURE_EXT))
    }
}

fn validate_id(id: &str) -> Result<(), ConfigError> {
    if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(ConfigError::InvalidCaptureId(id.to_string()));
    }
    Ok(())
}

/// Append-only writer for a capture being recorded.
pub struct CaptureWriter {
    id: String,
    path: PathBuf,
    file: BufWriter<NamedTempFile>,
}

impl CaptureWriter {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Flush and move the capture into place under its id.
    pub fn commit(self) -> io::Result<String> {
        let file = self.file.into_inner().map_err(|e| e.into_error())?;
        file.persist(&self.path).map_err(|e| e.error)?;
        debug!(id = %self.id, path = %self.path.display(), "capture stored");
        Ok(self.id)
    }
}

/// Bytes go to the temporary file; nothing is visible until `commit`.
impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// A stored capture opened for replay.
#[derive(Debug, Clone)]
pub struct Capture {
    pub id: String,
    pub path: PathBuf,
    pub total_lines: usize,
}

impl Capture {
    pub fn reader(&self, buffer_size: usize) -> io::Result<BufReader<File>> {
        Ok(BufReader::with_capacity(buffer_size, File::open(&self.path)?))
    }
}

#[derive(Debug, Clone)]
pub struct CaptureInfo {
    pub id: String,
    pub lines: usize,
    pub modified: Option<SystemTime>,
}

impl CaptureInfo {
    /// Seconds since the capture was last written, or 0 if unknown.
    pub fn age_secs(&self, now: DateTime<Utc>) -> i64 {
        self.modified
            .map(|m| now.signed_duration_since(DateTime::<Utc>::from(m)).num_seconds())
            .unwrap_or(0)
    }
}

/// Coarse age: `42s ago`, `5m ago`, `3h ago`, `2d ago`.
pub fn format_age(secs: i64) -> String {
    match secs {
        s if s <= 0 => "unknown".to_string(),
        s if s < 60 => format!("{}s ago", s),
        s if s < 3600 => format!("{}m ago", s / 60),
        s if s < 86400 => format!("{}h ago", s / 3600),
        s => format!("{}d ago", s / 86400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(0), "unknown");
        assert_eq!(format_age(-5), "unknown");
        assert_eq!(format_age(30), "30s ago");
        assert_eq!(format_age(59), "59s ago");
        assert_eq!(format_age(60), "1m ago");
        assert_eq!(format_age(3599), "59m ago");
        assert_eq!(format_age(3600), "1h ago");
        assert_eq!(format_age(86399), "23h ago");
        assert_eq!(format_age(86400), "1d ago");
        assert_eq!(format_age(259200), "3d ago");
    }

    #[test]
    fn test_generate_id_shape() {
        let id = CaptureStore::generate_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3, "id {}", id);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_commit_then_open() {
        let tmp = TempDir::new().unwrap();
        let store = CaptureStore::new(tmp.path().join("captures"));

        let mut writer = store.create(1024).unwrap();
        writer.write_all(b"first\r\nsecond\n").unwrap();
        let id = writer.commit().unwrap();

        let capture = store.open(&id).unwrap();
        assert_eq!(capture.total_lines, 2);
        let mut content = Vec::new();
        capture.reader(1024).unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"first\r\nsecond\n".to_vec());
    }

    #[test]
    fn test_uncommitted_capture_leaves_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = CaptureStore::new(tmp.path().join("captures"));

        let mut writer = store.create(1024).unwrap();
        writer.write_all(b"partial\n").unwrap();
        let id = writer.id().to_string();
        drop(writer);

        assert!(matches!(store.open(&id), Err(GlanceError::CaptureNotFound(_))));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_open_rejects_bad_ids() {
        let tmp = TempDir::new().unwrap();
        let store = CaptureStore::new(tmp.path());
        for id in ["", "../../etc/passwd", "foo/bar", "foo..bar"] {
            let err = store.open(id).unwrap_err();
            assert!(
                matches!(err, GlanceError::Config(ConfigError::InvalidCaptureId(_))),
                "id {:?} gave {:?}",
                id,
                err
            );
        }
        assert!(matches!(store.open("zzz"), Err(GlanceError::CaptureNotFound(_))));
    }

    #[test]
    fn test_list_and_clean() {
        let tmp = TempDir::new().unwrap();
        let store = CaptureStore::new(tmp.path().join("captures"));
        assert!(store.list().unwrap().is_empty());

        for lines in [3, 1] {
            let mut writer = store.create(1024).unwrap();
            for i in 0..lines {
                writeln!(writer, "{}", i).unwrap();
            }
            writer.commit().unwrap();
        }

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        let mut counts: Vec<usize> = listed.iter().map(|c| c.lines).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 3]);

        store.clean().unwrap();
        assert!(store.list().unwrap().is_empty());
        store.clean().unwrap();
    }
}
