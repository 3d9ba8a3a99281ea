//! Per-install ledger of placed files, and its rollback.
//!
//! Each package install owns its own session, so a failing install only ever
//! removes files it wrote itself. The ledger is append-only during a run and
//! drained by rollback.

use std::fs;
use std::path::PathBuf;

/// Ledger of destination paths written during a single package install.
#[derive(Debug, Default)]
pub struct Session {
    placed: Vec<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully written destination path.
    pub fn record(&mut self, path: PathBuf) {
        self.placed.push(path);
    }

    /// Paths written so far, in placement order.
    pub fn placed(&self) -> &[PathBuf] {
        &self.placed
    }

    /// Best-effort removal of every recorded path, newest first.
    ///
    /// Individual removal failures are logged and counted but never stop the
    /// sweep. Returns the number of paths that could not be removed.
    pub fn rollback(&mut self) -> usize {
        let mut failed = 0;
        for path in self.placed.drain(..).rev() {
            if let Err(err) = fs::remove_file(&path) {
                eprintln!("warning: cannot remove {}: {}", path.display(), err);
                failed += 1;
            }
        }
        failed
    }
}
