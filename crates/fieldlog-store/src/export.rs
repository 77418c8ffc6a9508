//! Export sinks for sharing the log file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

/// Destination that receives the log file for platform sharing.
///
/// The sink is handed a snapshot path and returns where the data ended up;
/// the store itself stays read-only during export.
pub trait ExportSink: Send + Sync {
    /// Hand the log file at `path` to the sharing target.
    fn share(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Sink that copies the log into a directory under a timestamped name.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Export into the given directory, created on demand.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Export into the platform download directory, falling back to the
    /// current directory.
    pub fn default_location() -> Self {
        let dir = dirs::download_dir()
            .or_else(dirs::document_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir)
    }
}

impl ExportSink for DirectorySink {
    fn share(&self, path: &Path) -> io::Result<PathBuf> {
        let timestamp = time::OffsetDateTime::now_utc()
            .format(
                &time::format_description::parse("[year][month][day]_[hour][minute][second]")
                    .expect("static format description"),
            )
            .unwrap_or_else(|_| "export".to_string());
        let filename = format!("fieldlog_{}.csv", timestamp);

        fs::create_dir_all(&self.dir)?;
        let destination = self.dir.join(filename);
        fs::copy(path, &destination)?;

        info!("Log exported to {}", destination.display());
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_sink_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("readings.csv");
        fs::write(&source, "\"a\"\n").unwrap();

        let sink = DirectorySink::new(dir.path().join("exports"));
        let destination = sink.share(&source).unwrap();

        assert!(destination.starts_with(dir.path().join("exports")));
        assert_eq!(fs::read_to_string(&destination).unwrap(), "\"a\"\n");
    }

    #[test]
    fn test_directory_sink_filename_shape() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("readings.csv");
        fs::write(&source, "").unwrap();

        let sink = DirectorySink::new(dir.path());
        let destination = sink.share(&source).unwrap();
        let name = destination.file_name().unwrap().to_str().unwrap();

        assert!(name.starts_with("fieldlog_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_directory_sink_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        assert!(sink.share(&dir.path().join("absent.csv")).is_err());
    }
}
