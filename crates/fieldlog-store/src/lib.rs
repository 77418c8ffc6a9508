//! Local persistence for fieldlog sensor readings.
//!
//! This crate provides the append-only record store: a single quoted-CSV
//! text file holding one reading per line, plus export sinks for sharing it.
//!
//! # Durability
//!
//! Every mutation replaces the whole file via a temp-file-and-rename, so a
//! crash mid-write can never leave a torn line. The append pipeline
//! (existence check, read, write) reports the failing step and performs no
//! rollback of earlier steps.
//!
//! # Example
//!
//! ```no_run
//! use fieldlog_store::RecordStore;
//!
//! let store = RecordStore::open_default();
//! for sample in store.read_all()? {
//!     println!("{} {} °C", sample.timestamp, sample.temperature);
//! }
//! # Ok::<(), fieldlog_store::Error>(())
//! ```

mod error;
mod export;
mod store;

pub use error::{Error, Result};
pub use export::{DirectorySink, ExportSink};
pub use store::RecordStore;

/// Default log file path following platform conventions.
///
/// - Linux: `~/.local/share/fieldlog/readings.csv`
/// - macOS: `~/Library/Application Support/fieldlog/readings.csv`
/// - Windows: `C:\Users\<user>\AppData\Local\fieldlog\readings.csv`
pub fn default_log_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("fieldlog")
        .join("readings.csv")
}
