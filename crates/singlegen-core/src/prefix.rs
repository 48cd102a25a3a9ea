//! File-name prefix convention
//!
//! Double-precision sources are named `D<rest>`, their float counterparts
//! `S<rest>`. Only the prefix is touched: the rest of a file name is kept
//! byte for byte, even when it is not valid UTF-8.

use std::ffi::{OsStr, OsString};

/// Prefix swap applied to file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePrefix {
    /// Prefix marking files of the source variant
    pub source: String,
    /// Prefix given to files of the generated variant
    pub target: String,
}

impl FilePrefix {
    /// Create new prefix rule
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Check if a file name carries the source prefix
    #[inline]
    #[must_use]
    pub fn is_source(&self, name: &str) -> bool {
        !self.source.is_empty() && name.starts_with(&self.source)
    }

    /// Check if a file name carries the target prefix
    #[inline]
    #[must_use]
    pub fn is_target(&self, name: &str) -> bool {
        !self.target.is_empty() && name.starts_with(&self.target)
    }

    /// Target name for a source-prefixed file name
    ///
    /// Returns `None` when the name does not carry the source prefix.
    #[must_use]
    pub fn rename(&self, name: &str) -> Option<String> {
        if !self.is_source(name) {
            return None;
        }
        Some(format!("{}{}", self.target, &name[self.source.len()..]))
    }

    /// Check if an OS file name carries the source prefix
    #[inline]
    #[must_use]
    pub fn is_source_os(&self, name: &OsStr) -> bool {
        strip_os_prefix(name, &self.source).is_some()
    }

    /// Check if an OS file name carries the target prefix
    #[inline]
    #[must_use]
    pub fn is_target_os(&self, name: &OsStr) -> bool {
        strip_os_prefix(name, &self.target).is_some()
    }

    /// Target name for a source-prefixed OS file name
    ///
    /// Bytes after the prefix are copied unchanged.
    #[must_use]
    pub fn rename_os(&self, name: &OsStr) -> Option<OsString> {
        let rest = strip_os_prefix(name, &self.source)?;
        let mut out = OsString::from(&self.target);
        out.push(rest);
        Some(out)
    }
}

/// Remainder of `name` after a non-empty `prefix`
#[cfg(unix)]
fn strip_os_prefix<'a>(name: &'a OsStr, prefix: &str) -> Option<&'a OsStr> {
    use std::os::unix::ffi::OsStrExt;

    if prefix.is_empty() {
        return None;
    }
    name.as_bytes()
        .strip_prefix(prefix.as_bytes())
        .map(OsStr::from_bytes)
}

/// Remainder of `name` after a non-empty `prefix`
///
/// Names that are not valid Unicode never match here.
#[cfg(not(unix))]
fn strip_os_prefix<'a>(name: &'a OsStr, prefix: &str) -> Option<&'a OsStr> {
    if prefix.is_empty() {
        return None;
    }
    name.to_str()?.strip_prefix(prefix).map(OsStr::new)
}

impl Default for FilePrefix {
    fn default() -> Self {
        Self::new("D", "S")
    }
}
