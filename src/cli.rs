//! Command-line interface for ArcAudit

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "arcaudit")]
#[command(about = "ArcAudit - Nested archive audit and page accounting", long_about = None)]
pub struct Cli {
    /// Top-level data directory holding one sub-directory per entity
    pub root: PathBuf,

    /// Audit only this entity (default: every entity under the root)
    pub entity: Option<String>,

    /// Legacy code page for member names that are not valid UTF-8
    /// (any WHATWG encoding label)
    #[arg(long, default_value = "gbk")]
    pub legacy_encoding: String,

    /// Parent directory for scratch extraction directories
    #[arg(long, default_value = ".")]
    pub scratch_dir: PathBuf,
}
