//! ArcAudit - Audits nested zip hierarchies and extrapolates page totals

use anyhow::{bail, Result};
use arcaudit_core::{
    audit, ArchiveWalker, ConsoleSink, EntityAggregator, NameDecodePolicy, PdfPageCounter,
    ScratchSpace,
};
use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> Result<()> {
    // Warnings are part of the report contract, so they are on by default;
    // RUST_LOG still overrides.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let Some(policy) = NameDecodePolicy::from_label(&cli.legacy_encoding) else {
        bail!("Unknown encoding label: {}", cli.legacy_encoding);
    };
    if !cli.root.is_dir() {
        bail!("Not a directory: {}", cli.root.display());
    }

    let walker = ArchiveWalker::new(ScratchSpace::new(&cli.scratch_dir), PdfPageCounter, policy);
    let aggregator = EntityAggregator::new(walker);
    let mut sink = ConsoleSink;
    audit(&cli.root, cli.entity.as_deref(), &aggregator, &mut sink)?;
    Ok(())
}
