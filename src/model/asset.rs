use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Reference to an audio file on disk
///
/// Owned by the caller. The pipeline reads it but never modifies or deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioAsset {
    /// Identifier used to derive output names (usually the upload id)
    pub id: String,

    /// Absolute path to the file
    pub path: PathBuf,

    /// Lower-cased container extension, e.g. "mp3" (empty if unknown)
    pub format: String,
}

impl AudioAsset {
    /// Create an asset with an explicit identifier
    ///
    /// Relative paths are made absolute against the current directory. The
    /// file does not have to exist yet.
    pub fn new(id: impl Into<String>, path: impl AsRef<Path>) -> io::Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        Ok(Self {
            id: id.into(),
            path,
            format,
        })
    }

    /// Create an asset identified by its file stem
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "asset".to_string());
        Self::new(id, path)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_derives_id_and_format() {
        let asset = AudioAsset::from_path("uploads/abc123.MP3").unwrap();
        assert_eq!(asset.id, "abc123");
        assert_eq!(asset.format, "mp3");
        assert!(asset.path.is_absolute());
        assert_eq!(asset.file_name(), "abc123.MP3");
    }

    #[test]
    fn test_missing_extension_has_empty_format() {
        let asset = AudioAsset::new("x", "/tmp/no_extension").unwrap();
        assert_eq!(asset.format, "");
        assert!(!asset.exists());
    }
}
