//! Per-entity aggregation, extrapolation, and the audit driver.

use anyhow::{Context, Result};
use log::warn;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pdf::PageCounter;
use crate::report::ReportSink;
use crate::walker::{member_annotation, ArchiveWalker, CountAggregate};

/// Optional per-entity metadata file recording the real archive count.
const BASELINE_FILE: &str = "count.txt";

/// Summary produced for one audited entity. Built once per run, rendered,
/// then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReport {
    pub entity: String,
    /// Top-level archives actually present and processed.
    pub sample_archives: u64,
    pub sample_pages: u64,
    /// Recorded population size; 0 when no baseline file exists.
    pub real_archives: u64,
    pub counts: CountAggregate,
}

impl EntityReport {
    /// Estimated page total of the full population, extrapolated from the
    /// sampled archives. `sample_archives` is nonzero by construction: an
    /// entity without archives never produces a report.
    pub fn estimated_real_pages(&self) -> f64 {
        self.sample_pages as f64 / self.sample_archives as f64 * self.real_archives as f64
    }
}

impl fmt::Display for EntityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Image formats have no document/page distinction, so count and
        // sub-count show the same value.
        write!(
            f,
            "entity: {} sample_archives: {} sample_pages: {} \
             [pdf: {}({}), png: {}({}), jpg: {}({}), jpeg: {}({})] \
             real_archives: {} estimated_real_pages: {:.2}",
            self.entity,
            self.sample_archives,
            self.sample_pages,
            self.counts.pdf_documents,
            self.counts.pdf_pages,
            self.counts.png,
            self.counts.png,
            self.counts.jpg,
            self.counts.jpg,
            self.counts.jpeg,
            self.counts.jpeg,
            self.real_archives,
            self.estimated_real_pages(),
        )
    }
}

/// Drives the walker over every top-level archive of one entity.
pub struct EntityAggregator<C> {
    walker: ArchiveWalker<C>,
}

impl<C: PageCounter> EntityAggregator<C> {
    pub fn new(walker: ArchiveWalker<C>) -> Self {
        Self { walker }
    }

    /// Audit one entity directory. Returns `None` (with a warning) when
    /// the entity holds no top-level archives.
    pub fn audit_entity(
        &self,
        entity_path: &Path,
        entity: &str,
        sink: &mut dyn ReportSink,
    ) -> Result<Option<EntityReport>> {
        let archives = list_archives(entity_path)?;
        if archives.is_empty() {
            warn!("entity: {entity} Empty Warning! Skipped it.");
            return Ok(None);
        }
        let real_archives = read_baseline(&entity_path.join(BASELINE_FILE))?;

        sink.line("");
        sink.emit(0, entity, "");

        let mut sample_pages = 0u64;
        let mut counts = CountAggregate::default();
        for archive in &archives {
            let name = archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            sink.emit(1, &name, &member_annotation(archive, None)?);
            let (pages, sub) = self.walker.count_archive(archive, 2, sink)?;
            sample_pages += pages;
            counts.absorb(&sub);
        }

        let report = EntityReport {
            entity: entity.to_string(),
            sample_archives: archives.len() as u64,
            sample_pages,
            real_archives,
            counts,
        };
        sink.line(&report.to_string());
        Ok(Some(report))
    }
}

/// Top-level `*.zip` files directly inside the entity directory, sorted.
fn list_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if is_zip && path.is_file() {
            archives.push(path);
        }
    }
    archives.sort();
    Ok(archives)
}

/// Read the recorded real archive count: the first whitespace-delimited
/// token of the file's first line. An absent file means no baseline.
fn read_baseline(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Ok(0);
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let token = text
        .lines()
        .next()
        .unwrap_or("")
        .split_whitespace()
        .next()
        .with_context(|| format!("No baseline count in {}", path.display()))?;
    token
        .parse::<u64>()
        .with_context(|| format!("Invalid baseline count {:?} in {}", token, path.display()))
}

/// Audit every entity directory under `root`, optionally filtered to one
/// name. A failing entity is reported and does not stop its siblings.
pub fn audit<C: PageCounter>(
    root: &Path,
    only: Option<&str>,
    aggregator: &EntityAggregator<C>,
    sink: &mut dyn ReportSink,
) -> Result<Vec<EntityReport>> {
    let entries =
        fs::read_dir(root).with_context(|| format!("Failed to list {}", root.display()))?;
    let mut entities = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", root.display()))?;
        if entry.path().is_dir() {
            entities.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    entities.sort();

    sink.line("");
    sink.line(&format!("Folder {}: {:?}", root.display(), entities));
    if let Some(only) = only {
        entities.retain(|e| e == only);
    }
    sink.line(&format!("Choose: {entities:?}"));

    let mut reports = Vec::new();
    for entity in &entities {
        match aggregator.audit_entity(&root.join(entity), entity, sink) {
            Ok(Some(report)) => reports.push(report),
            Ok(None) => {}
            Err(err) => warn!("entity: {entity} audit failed: {err:#}"),
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    #[test]
    fn test_estimate_formula() {
        let report = EntityReport {
            entity: "acme".to_string(),
            sample_archives: 4,
            sample_pages: 100,
            real_archives: 10,
            counts: CountAggregate::default(),
        };
        assert_eq!(report.estimated_real_pages(), 250.0);
    }

    #[test]
    fn test_report_rendering() {
        let report = EntityReport {
            entity: "acme".to_string(),
            sample_archives: 1,
            sample_pages: 4,
            real_archives: 10,
            counts: CountAggregate {
                png: 1,
                jpg: 0,
                jpeg: 0,
                pdf_documents: 1,
                pdf_pages: 3,
            },
        };
        assert_eq!(
            report.to_string(),
            "entity: acme sample_archives: 1 sample_pages: 4 \
             [pdf: 1(3), png: 1(1), jpg: 0(0), jpeg: 0(0)] \
             real_archives: 10 estimated_real_pages: 40.00"
        );
    }

    #[test]
    fn test_read_baseline_first_token() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("count.txt");
        let mut f = File::create(&path)?;
        writeln!(f, "37 archives delivered in total")?;
        writeln!(f, "second line is ignored")?;

        assert_eq!(read_baseline(&path)?, 37);
        Ok(())
    }

    #[test]
    fn test_read_baseline_absent_file_is_zero() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(read_baseline(&dir.path().join("count.txt"))?, 0);
        Ok(())
    }

    #[test]
    fn test_read_baseline_malformed_is_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("count.txt");
        let mut f = File::create(&path)?;
        writeln!(f, "lots")?;

        assert!(read_baseline(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_list_archives_filters_and_sorts() -> Result<()> {
        let dir = tempfile::tempdir()?;
        File::create(dir.path().join("b.zip"))?;
        File::create(dir.path().join("a.ZIP"))?;
        File::create(dir.path().join("notes.txt"))?;
        File::create(dir.path().join("count.txt"))?;
        fs::create_dir(dir.path().join("sub.zip"))?;

        let archives = list_archives(dir.path())?;
        let names: Vec<_> = archives
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ZIP", "b.zip"]);
        Ok(())
    }
}
