//! Entry classification for routing extracted archive members

use std::path::Path;

/// Image formats tracked separately in the per-type counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpg,
    Jpeg,
}

/// Classified type of one extracted archive member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryType {
    /// Counts as one page
    Image(ImageFormat),
    /// Pages counted by the page counter
    Pdf,
    /// Recursed into as a nested archive
    Archive,
    /// Warned and skipped; carries the offending extension
    Unknown(String),
}

/// Classify a member by its filename extension (case-insensitive).
///
/// Classification is extension-only: the member content is never inspected.
pub fn classify(path: &Path) -> EntryType {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();

    match ext.as_str() {
        "png" => EntryType::Image(ImageFormat::Png),
        "jpg" => EntryType::Image(ImageFormat::Jpg),
        "jpeg" => EntryType::Image(ImageFormat::Jpeg),
        "pdf" => EntryType::Pdf,
        "zip" => EntryType::Archive,
        _ => EntryType::Unknown(ext),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_images() {
        assert_eq!(
            classify(&PathBuf::from("scan.png")),
            EntryType::Image(ImageFormat::Png)
        );
        assert_eq!(
            classify(&PathBuf::from("photo.JPG")),
            EntryType::Image(ImageFormat::Jpg)
        );
        assert_eq!(
            classify(&PathBuf::from("page.Jpeg")),
            EntryType::Image(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn test_classify_pdf_and_archive() {
        assert_eq!(classify(&PathBuf::from("contract.pdf")), EntryType::Pdf);
        assert_eq!(classify(&PathBuf::from("evidence.ZIP")), EntryType::Archive);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(
            classify(&PathBuf::from("notes.txt")),
            EntryType::Unknown("txt".to_string())
        );
        assert_eq!(
            classify(&PathBuf::from("README")),
            EntryType::Unknown(String::new())
        );
    }
}
