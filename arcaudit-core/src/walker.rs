//! Recursive archive traversal and page accounting.

use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

use crate::classify::{classify, EntryType, ImageFormat};
use crate::digest::{digest_file, fingerprint};
use crate::extract::{extract_flat, NameDecodePolicy};
use crate::pdf::PageCounter;
use crate::report::{annotate, human_size, ReportSink};
use crate::scratch::{ScratchDir, ScratchSpace};

/// Per-type counts accumulated across one archive subtree.
///
/// The aggregate returned for a nested archive is the exact component-wise
/// sum over everything inside it, at every nesting depth.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountAggregate {
    pub png: u64,
    pub jpg: u64,
    pub jpeg: u64,
    pub pdf_documents: u64,
    pub pdf_pages: u64,
}

impl CountAggregate {
    /// Merge the counts returned by a nested archive, component-wise.
    pub fn absorb(&mut self, other: &CountAggregate) {
        self.png += other.png;
        self.jpg += other.jpg;
        self.jpeg += other.jpeg;
        self.pdf_documents += other.pdf_documents;
        self.pdf_pages += other.pdf_pages;
    }

    fn bump_image(&mut self, format: ImageFormat) {
        match format {
            ImageFormat::Png => self.png += 1,
            ImageFormat::Jpg => self.jpg += 1,
            ImageFormat::Jpeg => self.jpeg += 1,
        }
    }
}

/// Size and digest annotation for one on-disk member, with an optional
/// pages figure in front.
pub(crate) fn member_annotation(path: &Path, pages: Option<u64>) -> Result<String> {
    let size = fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    let digest = digest_file(path)?;
    Ok(annotate(pages, &human_size(size), &fingerprint(&digest)))
}

/// Walks archives depth-first, accounting pages for every subtree.
pub struct ArchiveWalker<C> {
    scratch: ScratchSpace,
    counter: C,
    policy: NameDecodePolicy,
}

impl<C: PageCounter> ArchiveWalker<C> {
    pub fn new(scratch: ScratchSpace, counter: C, policy: NameDecodePolicy) -> Self {
        Self {
            scratch,
            counter,
            policy,
        }
    }

    /// Extract the archive at `path`, account every member, recurse into
    /// nested archives, and return `(total pages, per-type counts)`.
    ///
    /// `depth` only controls the indentation of emitted lines. The scratch
    /// directory is torn down before returning on success and failure
    /// alike; a teardown failure is itself fatal for this invocation.
    pub fn count_archive(
        &self,
        path: &Path,
        depth: usize,
        sink: &mut dyn ReportSink,
    ) -> Result<(u64, CountAggregate)> {
        let dir = self.scratch.acquire()?;
        let walked = self.walk_extracted(path, &dir, depth, sink);
        let released = self.scratch.release(dir);
        match (walked, released) {
            (Ok(totals), Ok(())) => Ok(totals),
            (Ok(_), Err(release_err)) => Err(release_err),
            (Err(walk_err), Ok(())) => Err(walk_err),
            (Err(walk_err), Err(release_err)) => {
                // The processing error wins, but a teardown failure must
                // not vanish with it.
                warn!("Scratch teardown also failed: {release_err:#}");
                Err(walk_err)
            }
        }
    }

    fn walk_extracted(
        &self,
        archive: &Path,
        dir: &ScratchDir,
        depth: usize,
        sink: &mut dyn ReportSink,
    ) -> Result<(u64, CountAggregate)> {
        let mut members = extract_flat(archive, dir.path(), self.policy)
            .with_context(|| format!("Failed to extract {}", archive.display()))?;
        members.sort();

        let mut pages = 0u64;
        let mut counts = CountAggregate::default();
        for member in &members {
            let name = member
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match classify(member) {
                EntryType::Image(format) => {
                    pages += 1;
                    counts.bump_image(format);
                    sink.emit(depth, &name, &member_annotation(member, Some(1))?);
                }
                EntryType::Pdf => {
                    let counted = self.counter.count(member);
                    pages += counted;
                    counts.pdf_documents += 1;
                    counts.pdf_pages += counted;
                    sink.emit(depth, &name, &member_annotation(member, Some(counted))?);
                }
                EntryType::Archive => {
                    sink.emit(depth, &name, &member_annotation(member, None)?);
                    let (nested_pages, nested_counts) =
                        self.count_archive(member, depth + 1, sink)?;
                    pages += nested_pages;
                    counts.absorb(&nested_counts);
                }
                EntryType::Unknown(ext) => {
                    warn!("Bad file type: {ext}. Skipped {name}.");
                }
            }
        }
        Ok((pages, counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_sums_every_component() {
        let mut total = CountAggregate {
            png: 1,
            jpg: 2,
            jpeg: 3,
            pdf_documents: 4,
            pdf_pages: 9,
        };
        total.absorb(&CountAggregate {
            png: 10,
            jpg: 20,
            jpeg: 30,
            pdf_documents: 1,
            pdf_pages: 7,
        });
        assert_eq!(
            total,
            CountAggregate {
                png: 11,
                jpg: 22,
                jpeg: 33,
                pdf_documents: 5,
                pdf_pages: 16,
            }
        );
    }

    #[test]
    fn test_bump_image_routes_by_format() {
        let mut counts = CountAggregate::default();
        counts.bump_image(ImageFormat::Png);
        counts.bump_image(ImageFormat::Jpg);
        counts.bump_image(ImageFormat::Jpg);
        counts.bump_image(ImageFormat::Jpeg);
        assert_eq!(counts.png, 1);
        assert_eq!(counts.jpg, 2);
        assert_eq!(counts.jpeg, 1);
    }
}
