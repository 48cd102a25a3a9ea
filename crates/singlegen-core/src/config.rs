//! Generation configuration
//!
//! A [`GenerationConfig`] names a root directory and one or more [`Job`]s.
//! The built-in default reproduces the JPOWER `tdouble` → `tfloat` job; other
//! trees are described in a TOML file:
//!
//! ```toml
//! root = "src"
//!
//! [[job]]
//! name = "jips"
//! base = "edu/cornell/pserc/jips"
//! replace = [
//!   { from = "tdouble", to = "tfloat" },
//!   { from = "Dips", to = "Sips" },
//! ]
//! ```

use crate::error::ConfigError;
use crate::prefix::FilePrefix;
use crate::table::SubstitutionTable;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default root, relative to the working directory
pub const DEFAULT_ROOT: &str = "src";

/// Name of the built-in job
pub const DEFAULT_JOB: &str = "jpower";

/// One source-to-variant derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Job name, used to select it
    pub name: String,
    /// Package directory containing both subpackages, relative to root
    pub base: PathBuf,
    /// Subpackage holding the double-precision sources
    pub source: String,
    /// Subpackage receiving the generated sources
    pub target: String,
    /// File-name prefix rule
    pub prefix: FilePrefix,
    /// Ordered content substitutions
    pub table: SubstitutionTable,
}

impl Job {
    /// Create job with `tdouble`/`tfloat` subpackages and `D`/`S` prefixes
    #[must_use]
    pub fn new(name: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
            source: "tdouble".to_string(),
            target: "tfloat".to_string(),
            prefix: FilePrefix::default(),
            table: SubstitutionTable::new(),
        }
    }

    /// The built-in JPOWER job
    #[must_use]
    pub fn jpower() -> Self {
        let job = Self::new(DEFAULT_JOB, Path::new("edu").join("cornell").join("pserc").join("jpower"));
        let table = SubstitutionTable::new()
            .with(job.source.as_str(), job.target.as_str())
            .with(format!("{}jp", job.prefix.source), format!("{}jp", job.prefix.target))
            .with("DoubleMatrix1D", "FloatMatrix1D")
            .with("DoubleMatrix2D", "FloatMatrix2D")
            .with("DoubleFunctions", "FloatFunctions")
            .with("dfunc", "sfunc")
            .with("SparseDoubleAlgebra", "SparseFloatAlgebra");
        job.with_table(table)
    }

    /// With subpackage names
    #[inline]
    #[must_use]
    pub fn with_subpackages(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.source = source.into();
        self.target = target.into();
        self
    }

    /// With prefix rule
    #[inline]
    #[must_use]
    pub fn with_prefix(mut self, prefix: FilePrefix) -> Self {
        self.prefix = prefix;
        self
    }

    /// With substitution table
    #[inline]
    #[must_use]
    pub fn with_table(mut self, table: SubstitutionTable) -> Self {
        self.table = table;
        self
    }

    /// Directory of the double-precision tree under `root`
    #[must_use]
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.base).join(&self.source)
    }

    /// Directory of the generated tree under `root`
    #[must_use]
    pub fn target_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.base).join(&self.target)
    }

    /// Check job constraints
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::invalid(format!("job '{}': {}", self.name, msg)));

        if self.name.is_empty() {
            return Err(ConfigError::invalid("job name must not be empty"));
        }
        if self.source.is_empty() || self.target.is_empty() {
            return fail("subpackage names must not be empty");
        }
        if self.source == self.target {
            return fail("source and target subpackages are the same");
        }
        if self.prefix.source.is_empty() || self.prefix.target.is_empty() {
            return fail("file prefixes must not be empty");
        }
        if self.prefix.source == self.prefix.target {
            return fail("source and target prefixes are the same");
        }
        if self.table.patterns().any(str::is_empty) {
            return fail("replacement patterns must not be empty");
        }
        Ok(())
    }
}

/// Root directory plus the jobs to run under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Directory the job paths are relative to
    pub root: PathBuf,
    /// Jobs in declaration order
    pub jobs: Vec<Job>,
}

impl GenerationConfig {
    /// Create config with no jobs
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            jobs: Vec::new(),
        }
    }

    /// With an additional job
    #[inline]
    #[must_use]
    pub fn with_job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// With a different root
    #[inline]
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Parse and validate config from TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or failed validation
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        let config = Self {
            root: raw.root,
            jobs: raw.job.into_iter().map(Job::from).collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate config from a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or does not validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Find job by name
    #[must_use]
    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.name == name)
    }

    /// Check config constraints
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::invalid("at least one job is required"));
        }
        let mut seen = HashSet::new();
        for job in &self.jobs {
            if !seen.insert(job.name.as_str()) {
                return Err(ConfigError::invalid(format!("duplicate job name '{}'", job.name)));
            }
            job.validate()?;
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT).with_job(Job::jpower())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_root")]
    root: PathBuf,
    #[serde(default)]
    job: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJob {
    name: String,
    base: PathBuf,
    #[serde(default = "default_source")]
    source: String,
    #[serde(default = "default_target")]
    target: String,
    #[serde(default = "default_source_prefix")]
    source_prefix: String,
    #[serde(default = "default_target_prefix")]
    target_prefix: String,
    #[serde(default)]
    replace: SubstitutionTable,
}

impl From<RawJob> for Job {
    fn from(raw: RawJob) -> Self {
        Self::new(raw.name, raw.base)
            .with_subpackages(raw.source, raw.target)
            .with_prefix(FilePrefix::new(raw.source_prefix, raw.target_prefix))
            .with_table(raw.replace)
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}

fn default_source() -> String {
    "tdouble".to_string()
}

fn default_target() -> String {
    "tfloat".to_string()
}

fn default_source_prefix() -> String {
    FilePrefix::default().source
}

fn default_target_prefix() -> String {
    FilePrefix::default().target
}
