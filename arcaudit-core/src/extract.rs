//! Flat zip extraction with legacy-encoding recovery of member names.

use encoding_rs::{Encoding, GBK};
use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::ZipArchive;

/// Errors surfaced by flat extraction. Fatal for the archive's subtree;
/// the caller decides how far they propagate.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Malformed archive {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Failed to write extracted member {name}: {source}")]
    Write {
        name: String,
        source: io::Error,
    },
}

/// Recovery policy for member names written under a legacy code page.
///
/// Names that are valid UTF-8 pass through untouched; anything else is
/// decoded with the configured fallback encoding. Decoding is lossy, so a
/// single undecodable name can never stall an extraction.
#[derive(Debug, Clone, Copy)]
pub struct NameDecodePolicy {
    legacy: &'static Encoding,
}

impl NameDecodePolicy {
    pub fn new(legacy: &'static Encoding) -> Self {
        Self { legacy }
    }

    /// Look up a policy by WHATWG encoding label, e.g. "gbk" or "shift_jis".
    pub fn from_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.as_bytes()).map(Self::new)
    }

    pub fn decode(&self, raw: &[u8]) -> String {
        if let Ok(name) = std::str::from_utf8(raw) {
            return name.to_string();
        }
        let (decoded, _, _) = self.legacy.decode(raw);
        decoded.into_owned()
    }
}

impl Default for NameDecodePolicy {
    fn default() -> Self {
        Self { legacy: GBK }
    }
}

/// Flatten a member path to a single filename: separators become `__`.
///
/// The source path encoding is not authoritative, so both separator styles
/// are substituted regardless of platform.
fn flatten_name(name: &str) -> String {
    name.replace(['/', '\\'], "__")
}

/// Resolve a flattened name against the names already extracted, inserting
/// a `__<n>` suffix before the extension on collision so classification is
/// unaffected.
fn disambiguate(name: &str, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    };
    let mut n = 1usize;
    loop {
        let candidate = format!("{stem}__{n}{ext}");
        if !used.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Extract every non-directory member of `archive` as a direct child of
/// `dest`, under its flattened, decoded name. No sub-directories are
/// created. Returns the extracted paths in member order.
pub fn extract_flat(
    archive: &Path,
    dest: &Path,
    policy: NameDecodePolicy,
) -> Result<Vec<PathBuf>, ExtractError> {
    let file = File::open(archive).map_err(|source| ExtractError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file).map_err(|source| ExtractError::Malformed {
        path: archive.to_path_buf(),
        source,
    })?;

    let mut used = HashSet::new();
    let mut extracted = Vec::new();
    for i in 0..zip.len() {
        let mut member = zip.by_index(i).map_err(|source| ExtractError::Malformed {
            path: archive.to_path_buf(),
            source,
        })?;
        if member.is_dir() {
            continue;
        }

        let decoded = policy.decode(member.name_raw());
        let mut flattened = flatten_name(&decoded);
        if flattened.is_empty() {
            flattened = format!("member__{i}");
        }
        let name = disambiguate(&flattened, &used);

        let target = dest.join(&name);
        let mut out = File::create(&target).map_err(|source| ExtractError::Write {
            name: name.clone(),
            source,
        })?;
        io::copy(&mut member, &mut out).map_err(|source| ExtractError::Write {
            name: name.clone(),
            source,
        })?;

        used.insert(name);
        extracted.push(target);
    }
    Ok(extracted)
}
