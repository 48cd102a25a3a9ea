//! Directory tree operations
//!
//! The three generation steps:
//! - [`copy_tree`]: reproduce the source tree, replacing any previous output
//! - [`rename_prefixed`]: swap the file-name prefix of every source-prefixed file
//! - [`substitute_contents`]: apply the substitution table to target-prefixed files
//!
//! Traversal is sorted by file name so every run visits files in the same
//! order.

use crate::error::{GenError, GenResult};
use crate::prefix::FilePrefix;
use crate::report::{RenamedFile, Residual, RewrittenFile, SkippedFile, SubstitutionOutcome};
use crate::table::SubstitutionTable;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Copy `source` to `dest`, removing `dest` first if it exists
///
/// Symbolic links are followed and copied as regular files.
///
/// # Returns
/// Number of files copied
///
/// # Errors
/// - [`GenError::SourceMissing`] if `source` is not a directory
/// - [`GenError::OverlappingTrees`] if either path contains the other
/// - [`GenError::Io`] / [`GenError::Walk`] on filesystem failures
pub fn copy_tree(source: &Path, dest: &Path) -> GenResult<usize> {
    if !source.is_dir() {
        return Err(GenError::SourceMissing(source.to_path_buf()));
    }

    let source_abs = resolve(source)?;
    let dest_abs = resolve(dest)?;
    if source_abs.starts_with(&dest_abs) || dest_abs.starts_with(&source_abs) {
        return Err(GenError::OverlappingTrees {
            source_dir: source.to_path_buf(),
            target_dir: dest.to_path_buf(),
        });
    }

    if dest.is_dir() {
        tracing::info!("Removing previous output: {}", dest.display());
        fs::remove_dir_all(dest).map_err(|e| GenError::io_error(dest, e))?;
    } else if dest.exists() {
        fs::remove_file(dest).map_err(|e| GenError::io_error(dest, e))?;
    }

    tracing::info!("Copying: {} -> {}", source.display(), dest.display());
    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(source).unwrap_or_else(|_| entry.path());
        let out = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&out).map_err(|e| GenError::io_error(&out, e))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &out).map_err(|e| GenError::io_error(&out, e))?;
            tracing::debug!("Copied: {}", relative.display());
            copied += 1;
        }
    }
    Ok(copied)
}

/// Rename every file under `dir` whose name starts with the source prefix
///
/// Directories keep their names. A rename onto an existing file replaces it.
/// Bytes after the prefix are kept as-is, so names that are not valid UTF-8
/// survive the rename.
///
/// # Errors
/// - [`GenError::TargetMissing`] if `dir` is not a directory
/// - [`GenError::Io`] / [`GenError::Walk`] on filesystem failures
pub fn rename_prefixed(dir: &Path, prefix: &FilePrefix) -> GenResult<Vec<RenamedFile>> {
    tracing::info!("Renaming: {}", dir.display());

    let candidates: Vec<(PathBuf, OsString)> = files(dir)?
        .into_iter()
        .filter_map(|entry| {
            let renamed = prefix.rename_os(entry.file_name())?;
            Some((entry.into_path(), renamed))
        })
        .collect();

    let mut renamed = Vec::with_capacity(candidates.len());
    for (from, name) in candidates {
        let to = from.with_file_name(&name);
        let overwrote = to.exists();
        if overwrote {
            tracing::warn!("Overwriting existing file: {}", to.display());
        }
        tracing::debug!("Writing: {}", to.display());
        fs::rename(&from, &to).map_err(|e| GenError::io_error(&from, e))?;

        renamed.push(RenamedFile {
            from: relative_to(&from, dir),
            to: relative_to(&to, dir),
            overwrote,
        });
    }
    Ok(renamed)
}

/// Apply `table` to every file under `dir` whose name starts with the target prefix
///
/// Files that are not valid UTF-8 are skipped. Files whose contents do not
/// change are left untouched on disk.
///
/// # Errors
/// - [`GenError::TargetMissing`] if `dir` is not a directory
/// - [`GenError::Io`] / [`GenError::Walk`] if a file cannot be read or written
pub fn substitute_contents(
    dir: &Path,
    prefix: &FilePrefix,
    table: &SubstitutionTable,
) -> GenResult<SubstitutionOutcome> {
    tracing::info!("Scanning: {}", dir.display());
    let mut outcome = SubstitutionOutcome::default();

    for entry in files(dir)? {
        if !prefix.is_target_os(entry.file_name()) {
            continue;
        }
        let path = entry.path();
        outcome.scanned += 1;

        let Some(text) = read_text(path)? else {
            tracing::warn!("Skipping non UTF-8 file: {}", path.display());
            outcome.skipped.push(SkippedFile {
                path: relative_to(path, dir),
                reason: "not valid UTF-8".to_string(),
            });
            continue;
        };

        let (rewritten, substitutions) = table.apply(&text);
        if substitutions == 0 || rewritten == text {
            continue;
        }

        tracing::debug!("Rewriting: {} ({} substitutions)", path.display(), substitutions);
        fs::write(path, rewritten).map_err(|e| GenError::io_error(path, e))?;
        outcome.rewritten.push(RewrittenFile {
            path: relative_to(path, dir),
            substitutions,
        });
    }
    Ok(outcome)
}

/// Find leftovers in a generated tree
///
/// Returns files still carrying the source prefix, and table patterns still
/// present in target-prefixed files. Entries whose replacement contains their
/// own pattern are not checked, since they always leave it behind.
///
/// # Errors
/// - [`GenError::TargetMissing`] if `dir` is not a directory
/// - [`GenError::Io`] / [`GenError::Walk`] if a file cannot be read
pub fn find_residuals(
    dir: &Path,
    prefix: &FilePrefix,
    table: &SubstitutionTable,
) -> GenResult<(Vec<PathBuf>, Vec<Residual>)> {
    let mut unrenamed = Vec::new();
    let mut residuals = Vec::new();

    for entry in files(dir)? {
        let name = entry.file_name();
        let path = entry.path();
        if prefix.is_source_os(name) {
            unrenamed.push(relative_to(path, dir));
            continue;
        }
        if !prefix.is_target_os(name) {
            continue;
        }
        let Some(text) = read_text(path)? else {
            continue;
        };
        for (from, to) in table.iter() {
            if from.is_empty() || to.contains(from) {
                continue;
            }
            let count = text.matches(from).count();
            if count > 0 {
                residuals.push(Residual {
                    path: relative_to(path, dir),
                    pattern: from.to_string(),
                    count,
                });
            }
        }
    }
    Ok((unrenamed, residuals))
}

/// Regular files under the generated tree `dir`, sorted by path
fn files(dir: &Path) -> GenResult<Vec<DirEntry>> {
    if !dir.is_dir() {
        return Err(GenError::TargetMissing(dir.to_path_buf()));
    }
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            out.push(entry);
        }
    }
    Ok(out)
}

/// File contents as text, `None` if not valid UTF-8
fn read_text(path: &Path) -> GenResult<Option<String>> {
    let bytes = fs::read(path).map_err(|e| GenError::io_error(path, e))?;
    Ok(String::from_utf8(bytes).ok())
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base).unwrap_or(path).to_path_buf()
}

/// Absolute, symlink-free form of a path that may not exist yet
///
/// The deepest existing ancestor is canonicalized and the remaining
/// components are appended lexically.
fn resolve(path: &Path) -> GenResult<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| GenError::io_error(path, e))?
            .join(path)
    };

    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = existing
        .canonicalize()
        .map_err(|e| GenError::io_error(existing, e))?;
    for component in rest.iter().rev() {
        resolved.push(component);
    }
    Ok(normalize(&resolved))
}

/// Drop `.` and fold `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, SystemTime};

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn copy_reproduces_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("tdouble");
        let dst = tmp.path().join("tfloat");
        write(&src, "Djp_a.java", "a");
        write(&src, "pf/Djp_b.java", "b");
        fs::create_dir_all(src.join("empty")).unwrap();

        assert_eq!(copy_tree(&src, &dst).unwrap(), 2);
        assert_eq!(fs::read_to_string(dst.join("pf/Djp_b.java")).unwrap(), "b");
        assert!(dst.join("empty").is_dir());
    }

    #[test]
    fn copy_replaces_previous_output() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("tdouble");
        let dst = tmp.path().join("tfloat");
        write(&src, "Djp_a.java", "a");
        write(&dst, "stale.java", "old");

        copy_tree(&src, &dst).unwrap();
        assert!(!dst.join("stale.java").exists());
        assert!(dst.join("Djp_a.java").exists());
    }

    #[test]
    fn copy_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_tree(&tmp.path().join("nope"), &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, GenError::SourceMissing(_)));
    }

    #[test]
    fn copy_rejects_nested_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("tdouble");
        write(&src, "Djp_a.java", "a");

        let err = copy_tree(&src, &src.join("tfloat")).unwrap_err();
        assert!(matches!(err, GenError::OverlappingTrees { .. }));

        let err = copy_tree(&src, &src.join("..").join("tdouble")).unwrap_err();
        assert!(matches!(err, GenError::OverlappingTrees { .. }));

        let err = copy_tree(&src, tmp.path()).unwrap_err();
        assert!(matches!(err, GenError::OverlappingTrees { .. }));
        assert!(src.join("Djp_a.java").exists());
    }

    #[test]
    fn rename_swaps_prefix_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(dir, "Djp_a.java", "");
        write(dir, "Dpf/Djp_b.java", "");
        write(dir, "package-info.java", "");

        let renamed = rename_prefixed(dir, &FilePrefix::default()).unwrap();
        let pairs: Vec<_> = renamed.iter().map(|r| (r.from.clone(), r.to.clone())).collect();
        assert_eq!(
            pairs,
            vec![
                (PathBuf::from("Djp_a.java"), PathBuf::from("Sjp_a.java")),
                (
                    Path::new("Dpf").join("Djp_b.java"),
                    Path::new("Dpf").join("Sjp_b.java")
                ),
            ]
        );
        assert!(dir.join("Dpf/Sjp_b.java").exists());
        assert!(dir.join("package-info.java").exists());
    }

    #[cfg(unix)]
    #[test]
    fn rename_keeps_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join(OsStr::from_bytes(b"D\xffjp.java")), "x").unwrap();

        let renamed = rename_prefixed(dir, &FilePrefix::default()).unwrap();
        let expected = PathBuf::from(OsStr::from_bytes(b"S\xffjp.java"));
        assert_eq!(renamed.len(), 1);
        assert_eq!(renamed[0].to, expected);
        assert!(dir.join(&expected).exists());
        assert!(!dir.join(OsStr::from_bytes(b"D\xffjp.java")).exists());

        let (unrenamed, _) =
            find_residuals(dir, &FilePrefix::default(), &SubstitutionTable::new()).unwrap();
        assert!(unrenamed.is_empty());
    }

    #[test]
    fn rename_missing_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let err = rename_prefixed(&tmp.path().join("tfloat"), &FilePrefix::default()).unwrap_err();
        assert!(matches!(err, GenError::TargetMissing(_)));
    }

    #[test]
    fn rename_overwrites_existing_target() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "Djp_a.java", "double");
        write(tmp.path(), "Sjp_a.java", "float");

        let renamed = rename_prefixed(tmp.path(), &FilePrefix::default()).unwrap();
        assert!(renamed[0].overwrote);
        assert_eq!(fs::read_to_string(tmp.path().join("Sjp_a.java")).unwrap(), "double");
        assert!(!tmp.path().join("Djp_a.java").exists());
    }

    #[test]
    fn substitute_only_target_prefixed() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(dir, "Sjp_a.java", "import tdouble.Djp_b; DoubleMatrix1D x;");
        write(dir, "util/Sjp_b.java", "int y;");
        write(dir, "Other.java", "DoubleMatrix1D z;");

        let table = SubstitutionTable::new()
            .with("tdouble", "tfloat")
            .with("Djp", "Sjp")
            .with("DoubleMatrix1D", "FloatMatrix1D");
        let outcome = substitute_contents(dir, &FilePrefix::default(), &table).unwrap();

        assert_eq!(outcome.scanned, 2);
        assert_eq!(
            outcome.rewritten,
            vec![RewrittenFile {
                path: PathBuf::from("Sjp_a.java"),
                substitutions: 3
            }]
        );
        assert_eq!(
            fs::read_to_string(dir.join("Sjp_a.java")).unwrap(),
            "import tfloat.Sjp_b; FloatMatrix1D x;"
        );
        assert_eq!(fs::read_to_string(dir.join("Other.java")).unwrap(), "DoubleMatrix1D z;");
    }

    #[test]
    fn substitute_leaves_unchanged_files_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(dir, "Sjp_clean.java", "float x;");
        write(dir, "Sjp_dirty.java", "double x;");

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        for name in ["Sjp_clean.java", "Sjp_dirty.java"] {
            let file = fs::File::options().write(true).open(dir.join(name)).unwrap();
            file.set_modified(old).unwrap();
        }

        let table = SubstitutionTable::new().with("double", "float");
        let outcome = substitute_contents(dir, &FilePrefix::default(), &table).unwrap();
        assert_eq!(outcome.scanned, 2);
        assert_eq!(outcome.rewritten.len(), 1);

        let modified = |name: &str| fs::metadata(dir.join(name)).unwrap().modified().unwrap();
        assert_eq!(modified("Sjp_clean.java"), old);
        assert_ne!(modified("Sjp_dirty.java"), old);
        assert_eq!(fs::read_to_string(dir.join("Sjp_clean.java")).unwrap(), "float x;");
    }

    #[test]
    fn substitute_skips_binary() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("Sjp_blob.bin"), [0xff, 0xfe, b'D', b'j', b'p']).unwrap();

        let table = SubstitutionTable::new().with("Djp", "Sjp");
        let outcome = substitute_contents(tmp.path(), &FilePrefix::default(), &table).unwrap();
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.rewritten.is_empty());
        assert_eq!(
            fs::read(tmp.path().join("Sjp_blob.bin")).unwrap(),
            vec![0xff, 0xfe, b'D', b'j', b'p']
        );
    }

    #[test]
    fn residuals_found() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "Djp_left.java", "");
        write(tmp.path(), "Sjp_a.java", "dfunc dfunc Double");

        let table = SubstitutionTable::new()
            .with("dfunc", "sfunc")
            .with("Double", "DoubleFloat");
        let (unrenamed, residuals) = find_residuals(tmp.path(), &FilePrefix::default(), &table).unwrap();
        assert_eq!(unrenamed, vec![PathBuf::from("Djp_left.java")]);
        assert_eq!(
            residuals,
            vec![Residual {
                path: PathBuf::from("Sjp_a.java"),
                pattern: "dfunc".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn normalize_folds_parent() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
    }
}
