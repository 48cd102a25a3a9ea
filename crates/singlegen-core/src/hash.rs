//! Content hashing for generated trees
//!
//! Provides [`ContentHash`], a 32-byte Blake3 digest, and [`TreeFingerprint`],
//! which hashes a whole directory tree so two generation runs can be compared.

use crate::error::{GenError, GenResult};
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use walkdir::WalkDir;

/// A 32-byte content hash (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl serde::Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Hash over every file of a directory tree
///
/// Files are visited in sorted relative-path order. Each file contributes its
/// relative path (with `/` separators) and the hash of its contents, so a
/// rename changes the fingerprint just like an edit does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TreeFingerprint {
    /// Combined hash
    pub hash: ContentHash,
    /// Number of files hashed
    pub files: usize,
}

impl TreeFingerprint {
    /// Fingerprint the tree rooted at `root`
    ///
    /// # Errors
    /// Returns error if the tree cannot be walked or a file cannot be read
    pub fn of_tree(root: &Path) -> GenResult<Self> {
        let mut hasher = blake3::Hasher::new();
        let mut files = 0;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or_else(|_| entry.path());
            let contents =
                std::fs::read(entry.path()).map_err(|e| GenError::io_error(entry.path(), e))?;

            hasher.update(relative_key(relative).as_bytes());
            hasher.update(&[0]);
            hasher.update(ContentHash::compute(&contents).as_bytes());
            files += 1;
        }

        Ok(Self {
            hash: ContentHash::new(*hasher.finalize().as_bytes()),
            files,
        })
    }
}

impl Display for TreeFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} files)", self.hash.short(), self.files)
    }
}

/// Platform-independent key for a relative path
pub(crate) fn relative_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn hash_compute_deterministic() {
        let a = ContentHash::compute(b"DoubleMatrix1D");
        let b = ContentHash::compute(b"DoubleMatrix1D");
        let c = ContentHash::compute(b"FloatMatrix1D");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn hash_display_and_short() {
        let hash = ContentHash::compute(b"x");
        assert_eq!(hash.to_string().len(), 64);
        assert_eq!(hash.short().len(), 16);
        assert!(hash.to_string().starts_with(&hash.short()));
    }

    #[test]
    fn hash_serializes_as_hex() {
        let hash = ContentHash::compute(b"x");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
    }

    #[test]
    fn fingerprint_tracks_content_and_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pf")).unwrap();
        fs::write(dir.path().join("Sjp_a.java"), "a").unwrap();
        fs::write(dir.path().join("pf/Sjp_b.java"), "b").unwrap();

        let first = TreeFingerprint::of_tree(dir.path()).unwrap();
        assert_eq!(first.files, 2);
        assert_eq!(first, TreeFingerprint::of_tree(dir.path()).unwrap());

        fs::write(dir.path().join("pf/Sjp_b.java"), "c").unwrap();
        let edited = TreeFingerprint::of_tree(dir.path()).unwrap();
        assert_ne!(first.hash, edited.hash);

        fs::rename(dir.path().join("pf/Sjp_b.java"), dir.path().join("pf/Sjp_c.java")).unwrap();
        let renamed = TreeFingerprint::of_tree(dir.path()).unwrap();
        assert_ne!(edited.hash, renamed.hash);
    }

    #[test]
    fn relative_key_uses_forward_slashes() {
        let path = Path::new("opf").join("Sjp_opf.java");
        assert_eq!(relative_key(&path), "opf/Sjp_opf.java");
    }
}
