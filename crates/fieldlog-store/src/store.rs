//! Main store implementation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use fieldlog_types::Sample;

use crate::error::{Error, Result};
use crate::export::ExportSink;

/// Append-only record store backed by a single quoted-CSV text file.
///
/// The file holds one sample per line, no header row, and is created lazily
/// on the first append. It is mutated only by [`append`](Self::append) and
/// [`clear`](Self::clear), and is assumed to have no external writers.
///
/// Writes always replace the whole file through a temporary file in the same
/// directory followed by a rename, so an interrupted write can never leave a
/// partially-written line behind.
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Create a store over the log file at `path`.
    ///
    /// The file is not touched until the first append or clear.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        debug!("Record store at {}", path.display());
        Self { path }
    }

    /// Open the default log location.
    pub fn open_default() -> Self {
        Self::open(crate::default_log_path())
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one sample to the log.
    ///
    /// Pipeline: existence check, read existing content, concatenate the new
    /// line, write the whole file back. After success the file exists and is
    /// non-empty. On failure the error names the step that failed and the
    /// store is left in whatever state the last successful step produced.
    ///
    /// # Errors
    ///
    /// [`Error::Probe`], [`Error::Read`], or [`Error::Write`] depending on
    /// the failing step.
    pub fn append(&self, sample: &Sample) -> Result<()> {
        let line = sample.to_csv_line();

        let exists = self.path.try_exists().map_err(|source| Error::Probe {
            path: self.path.clone(),
            source,
        })?;

        let mut content = if exists {
            fs::read_to_string(&self.path).map_err(|source| Error::Read {
                path: self.path.clone(),
                source,
            })?
        } else {
            String::new()
        };

        content.push_str(&line);
        self.write_whole(&content)?;

        info!("Appended record to {}", self.path.display());
        Ok(())
    }

    /// Read every stored sample, oldest first.
    ///
    /// A missing file is an empty store, not an error. Empty lines are
    /// skipped; any other unparsable line fails with its 1-based line number.
    pub fn read_all(&self) -> Result<Vec<Sample>> {
        let exists = self.path.try_exists().map_err(|source| Error::Probe {
            path: self.path.clone(),
            source,
        })?;
        if !exists {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| Error::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut samples = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let sample = Sample::from_csv_line(line).map_err(|source| Error::Malformed {
                line: index + 1,
                source,
            })?;
            samples.push(sample);
        }
        Ok(samples)
    }

    /// Overwrite the log with empty content.
    ///
    /// Succeeds even when the file never existed; afterwards the file exists
    /// and is empty.
    pub fn clear(&self) -> Result<()> {
        self.write_whole("")?;
        info!("Cleared log at {}", self.path.display());
        Ok(())
    }

    /// Hand the current log file to an external sharing collaborator.
    ///
    /// The sink receives the snapshot path; the store takes no lock and is
    /// not mutated. Returns the destination reported by the sink.
    ///
    /// # Errors
    ///
    /// [`Error::NoExportTarget`] when nothing has been written yet, or
    /// [`Error::Export`] when the sink fails.
    pub fn export(&self, sink: &dyn ExportSink) -> Result<PathBuf> {
        let exists = self.path.try_exists().map_err(|source| Error::Probe {
            path: self.path.clone(),
            source,
        })?;
        if !exists {
            return Err(Error::NoExportTarget);
        }
        sink.share(&self.path).map_err(Error::Export)
    }

    /// Replace the file content atomically: write a temp file alongside the
    /// target, then rename it into place.
    fn write_whole(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, content).map_err(|source| Error::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::DirectorySink;
    use fieldlog_types::GeoFix;
    use time::OffsetDateTime;

    fn test_sample(temperature: f64, humidity: f64) -> Sample {
        Sample::new(
            OffsetDateTime::UNIX_EPOCH,
            GeoFix::new(56.9496, 24.1052),
            temperature,
            humidity,
        )
    }

    fn temp_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("readings.csv"));
        (dir, store)
    }

    #[test]
    fn test_read_all_on_missing_file_is_empty() {
        let (_dir, store) = temp_store();
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_creates_file_lazily() {
        let (_dir, store) = temp_store();
        assert!(!store.path().exists());

        store.append(&test_sample(25.5, 60.0)).unwrap();

        assert!(store.path().exists());
        let content = fs::read_to_string(store.path()).unwrap();
        assert!(!content.is_empty());
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_append_then_read_all_returns_record() {
        let (_dir, store) = temp_store();
        let sample = test_sample(25.5, 60.0);

        store.append(&sample).unwrap();
        let records = store.read_all().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0], sample);
    }

    #[test]
    fn test_append_preserves_order_and_prior_records() {
        let (_dir, store) = temp_store();
        let first = test_sample(20.0, 40.0);
        let second = test_sample(21.5, 45.0);
        let third = test_sample(22.25, 50.5);

        store.append(&first).unwrap();
        store.append(&second).unwrap();
        store.append(&third).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].temperature, 20.0);
        assert_eq!(records[1].temperature, 21.5);
        assert_eq!(records[2].temperature, 22.25);
    }

    #[test]
    fn test_clear_empties_store() {
        let (_dir, store) = temp_store();
        for i in 0..5 {
            store.append(&test_sample(20.0 + f64::from(i), 50.0)).unwrap();
        }
        assert_eq!(store.read_all().unwrap().len(), 5);

        store.clear().unwrap();

        assert!(store.read_all().unwrap().is_empty());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "");
    }

    #[test]
    fn test_clear_is_idempotent_on_missing_file() {
        let (_dir, store) = temp_store();
        assert!(!store.path().exists());

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.path().exists());
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_after_clear() {
        let (_dir, store) = temp_store();
        store.append(&test_sample(20.0, 40.0)).unwrap();
        store.clear().unwrap();
        store.append(&test_sample(25.5, 60.0)).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].temperature, 25.5);
    }

    #[test]
    fn test_read_all_fails_on_malformed_line() {
        let (_dir, store) = temp_store();
        store.append(&test_sample(20.0, 40.0)).unwrap();

        let mut content = fs::read_to_string(store.path()).unwrap();
        content.push_str("not a record\n");
        fs::write(store.path(), content).unwrap();

        let err = store.read_all().unwrap_err();
        assert!(matches!(err, Error::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("nested").join("readings.csv"));

        store.append(&test_sample(20.0, 40.0)).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (_dir, store) = temp_store();
        store.append(&test_sample(20.0, 40.0)).unwrap();

        let tmp_name = format!("{}.tmp", store.path().file_name().unwrap().to_str().unwrap());
        let tmp = store.path().with_file_name(tmp_name);
        assert!(!tmp.exists());
    }

    #[test]
    fn test_export_missing_store_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::open(dir.path().join("readings.csv"));
        let sink = DirectorySink::new(dir.path().join("out"));

        let err = store.export(&sink).unwrap_err();
        assert!(matches!(err, Error::NoExportTarget));
    }

    #[test]
    fn test_export_copies_log_content() {
        let (dir, store) = temp_store();
        store.append(&test_sample(25.5, 60.0)).unwrap();

        let sink = DirectorySink::new(dir.path().join("out"));
        let destination = store.export(&sink).unwrap();

        assert!(destination.exists());
        assert_eq!(
            fs::read_to_string(&destination).unwrap(),
            fs::read_to_string(store.path()).unwrap()
        );
        // Export must not mutate the store.
        assert_eq!(store.read_all().unwrap().len(), 1);
    }
}
