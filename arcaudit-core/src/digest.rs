use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Hash a file's content as a 64-character lowercase sha256 hex string.
pub fn digest_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    digest_reader(&mut file).with_context(|| format!("Failed to hash {}", path.display()))
}

fn digest_reader<R: Read>(reader: &mut R) -> Result<String> {
    let mut h = Sha256::new();
    let mut buf = [0u8; 1024 * 1024];
    loop {
        let n = reader.read(&mut buf).context("Failed to read while hashing")?;
        if n == 0 {
            break;
        }
        h.update(&buf[..n]);
    }
    Ok(hex::encode(h.finalize()))
}

/// Shorten a digest for report display: first 4 + ".." + last 4 characters.
///
/// The full digest is never surfaced anywhere else.
pub fn fingerprint(digest: &str) -> String {
    if digest.len() <= 10 {
        return digest.to_string();
    }
    format!("{}..{}", &digest[..4], &digest[digest.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_digest_empty_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty.bin");
        File::create(&path)?;

        let digest = digest_file(&path)?;
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        Ok(())
    }

    #[test]
    fn test_digest_known_content() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("abc.bin");
        let mut f = File::create(&path)?;
        f.write_all(b"abc")?;

        let digest = digest_file(&path)?;
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        Ok(())
    }

    #[test]
    fn test_fingerprint_truncation() {
        let digest = "ab41cd0000000000000000000000000000000000000000000000000000ef160b";
        assert_eq!(digest.len(), 64);
        assert_eq!(fingerprint(digest), "ab41..160b");
    }

    #[test]
    fn test_fingerprint_short_input_passthrough() {
        assert_eq!(fingerprint("ab41160b"), "ab41160b");
    }
}
