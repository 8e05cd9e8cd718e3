//! PDF page counting behind a quiet, infallible boundary.

use log::{warn, LevelFilter};
use lopdf::Document;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Counts pages in a document. Never fails past this boundary: unreadable
/// input is reported as 0 pages.
pub trait PageCounter {
    fn count(&self, path: &Path) -> u64;
}

/// `lopdf`-backed page counter.
///
/// Parser diagnostics are muted for the duration of the load so a corrupt
/// document cannot spray warnings between report lines; our own warning is
/// emitted after the muted scope ends.
#[derive(Debug, Default)]
pub struct PdfPageCounter;

impl PageCounter for PdfPageCounter {
    fn count(&self, path: &Path) -> u64 {
        let loaded = {
            let _quiet = MutedDiagnostics::engage();
            Document::load(path)
        };
        match loaded {
            Ok(doc) => {
                let pages = doc.get_pages().len() as u64;
                if pages == 0 {
                    warn!("No pages in {}", path.display());
                }
                pages
            }
            Err(err) => {
                warn!("Failed to read {}: {}", path.display(), err);
                0
            }
        }
    }
}

static MUTE: Mutex<()> = Mutex::new(());

/// Scoped mute of the global `log` filter.
///
/// The previous filter is restored on drop, on every exit path. The mutex
/// serializes overlapping scopes so one cannot restore the muted level
/// another installed.
struct MutedDiagnostics {
    previous: LevelFilter,
    _guard: MutexGuard<'static, ()>,
}

impl MutedDiagnostics {
    fn engage() -> Self {
        let guard = MUTE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = log::max_level();
        log::set_max_level(LevelFilter::Off);
        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for MutedDiagnostics {
    fn drop(&mut self) {
        log::set_max_level(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_garbage_counts_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        let mut f = File::create(&path).unwrap();
        f.write_all(b"not a pdf at all").unwrap();

        assert_eq!(PdfPageCounter.count(&path), 0);
    }

    #[test]
    fn test_missing_file_counts_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(PdfPageCounter.count(&dir.path().join("absent.pdf")), 0);
    }

    #[test]
    fn test_muted_scope_restores_filter() {
        log::set_max_level(LevelFilter::Warn);
        {
            let _quiet = MutedDiagnostics::engage();
            assert_eq!(log::max_level(), LevelFilter::Off);
        }
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
