//! Sinks for raw portal responses that could not be understood.

use std::fs;
use std::path::PathBuf;
use tracing::{error, warn};

/// Receives raw artifacts for later inspection.
pub trait DiagnosticSink: Send + Sync {
    /// Stores `contents` under `name`. Must not fail the caller.
    fn dump(&self, name: &str, contents: &[u8]);
}

/// Writes artifacts as files into a directory.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DiagnosticSink for FileSink {
    fn dump(&self, name: &str, contents: &[u8]) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            error!(dir = %self.dir.display(), error = %e, "Failed to create debug directory");
            return;
        }

        let path = self.dir.join(name);
        match fs::write(&path, contents) {
            Ok(()) => warn!(path = %path.display(), "Dumped portal response for debugging"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to write debug artifact"),
        }
    }
}

/// Discards everything.
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn dump(&self, _name: &str, _contents: &[u8]) {}
}

/// Keeps artifacts in memory.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    pub dumps: std::sync::Mutex<Vec<(String, Vec<u8>)>>,
}

#[cfg(test)]
impl DiagnosticSink for RecordingSink {
    fn dump(&self, name: &str, contents: &[u8]) {
        self.dumps
            .lock()
            .unwrap()
            .push((name.to_string(), contents.to_vec()));
    }
}
