//! Run reports
//!
//! Plain data describing what a generation or verification pass did. All
//! paths are relative to the generated tree.

use crate::hash::TreeFingerprint;
use serde::Serialize;
use std::path::PathBuf;

/// File renamed from source prefix to target prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedFile {
    /// Path before the rename
    pub from: PathBuf,
    /// Path after the rename
    pub to: PathBuf,
    /// Whether an existing file at `to` was replaced
    pub overwrote: bool,
}

/// File whose contents were rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewrittenFile {
    /// File path
    pub path: PathBuf,
    /// Number of substitutions made
    pub substitutions: usize,
}

/// File passed over during rewriting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    /// File path
    pub path: PathBuf,
    /// Why it was not rewritten
    pub reason: String,
}

/// Outcome of the substitution stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubstitutionOutcome {
    /// Target-prefixed files examined
    pub scanned: usize,
    /// Files that changed
    pub rewritten: Vec<RewrittenFile>,
    /// Files that could not be processed
    pub skipped: Vec<SkippedFile>,
}

impl SubstitutionOutcome {
    /// Total substitutions across all files
    #[must_use]
    pub fn total_substitutions(&self) -> usize {
        self.rewritten.iter().map(|f| f.substitutions).sum()
    }
}

/// Result of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Job that ran
    pub job: String,
    /// Generated tree
    pub target_dir: PathBuf,
    /// Files copied, `None` when the copy stage did not run
    pub copied: Option<usize>,
    /// Renames performed
    pub renamed: Vec<RenamedFile>,
    /// Content rewriting outcome, `None` when the stage did not run
    pub substitution: Option<SubstitutionOutcome>,
    /// Fingerprint of the generated tree after the run
    pub fingerprint: TreeFingerprint,
}

impl GenerationReport {
    /// Human-readable summary
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut lines = vec![
            format!("Job: {}", self.job),
            format!("Target: {}", self.target_dir.display()),
        ];
        if let Some(copied) = self.copied {
            lines.push(format!("  Copied: {copied} files"));
        }
        lines.push(format!("  Renamed: {} files", self.renamed.len()));
        if let Some(sub) = &self.substitution {
            lines.push(format!(
                "  Rewritten: {} of {} files ({} substitutions)",
                sub.rewritten.len(),
                sub.scanned,
                sub.total_substitutions()
            ));
            for skipped in &sub.skipped {
                lines.push(format!("  Skipped: {} ({})", skipped.path.display(), skipped.reason));
            }
        }
        lines.push(format!("  Fingerprint: {}", self.fingerprint));
        lines.join("\n")
    }
}

/// Mapped pattern still present in a generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Residual {
    /// File path
    pub path: PathBuf,
    /// Pattern found
    pub pattern: String,
    /// Number of occurrences
    pub count: usize,
}

/// Result of checking a generated tree for leftovers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Job that was checked
    pub job: String,
    /// Files still named with the source prefix
    pub unrenamed: Vec<PathBuf>,
    /// Patterns still present in target-prefixed files
    pub residuals: Vec<Residual>,
}

impl VerifyReport {
    /// Whether the tree is fully retargeted
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.unrenamed.is_empty() && self.residuals.is_empty()
    }

    /// Human-readable summary
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut lines = vec![format!("Job: {}", self.job)];
        for path in &self.unrenamed {
            lines.push(format!("  Not renamed: {}", path.display()));
        }
        for residual in &self.residuals {
            lines.push(format!(
                "  Residual: {} contains '{}' x{}",
                residual.path.display(),
                residual.pattern,
                residual.count
            ));
        }
        lines.push(format!("  Status: {}", if self.passed() { "PASSED" } else { "FAILED" }));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ContentHash;

    fn fingerprint() -> TreeFingerprint {
        TreeFingerprint {
            hash: ContentHash::compute(b""),
            files: 0,
        }
    }

    #[test]
    fn total_substitutions_sums_files() {
        let outcome = SubstitutionOutcome {
            scanned: 3,
            rewritten: vec![
                RewrittenFile {
                    path: "Sjp_a.java".into(),
                    substitutions: 2,
                },
                RewrittenFile {
                    path: "Sjp_b.java".into(),
                    substitutions: 5,
                },
            ],
            skipped: vec![],
        };
        assert_eq!(outcome.total_substitutions(), 7);
    }

    #[test]
    fn generation_text_omits_skipped_stages() {
        let report = GenerationReport {
            job: "jpower".to_string(),
            target_dir: "src/tfloat".into(),
            copied: None,
            renamed: vec![],
            substitution: None,
            fingerprint: fingerprint(),
        };
        let text = report.generate_text();
        assert!(text.contains("Job: jpower"));
        assert!(!text.contains("Copied"));
        assert!(!text.contains("Rewritten"));
    }

    #[test]
    fn verify_passed_and_text() {
        let mut report = VerifyReport {
            job: "jpower".to_string(),
            ..Default::default()
        };
        assert!(report.passed());
        assert!(report.generate_text().contains("PASSED"));

        report.residuals.push(Residual {
            path: "Sjp_a.java".into(),
            pattern: "DoubleMatrix1D".to_string(),
            count: 1,
        });
        assert!(!report.passed());
        assert!(report.generate_text().contains("FAILED"));
    }

    #[test]
    fn reports_serialize_to_json() {
        let report = VerifyReport {
            job: "jpower".to_string(),
            unrenamed: vec!["Djp_a.java".into()],
            residuals: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["unrenamed"][0], "Djp_a.java");
    }
}
