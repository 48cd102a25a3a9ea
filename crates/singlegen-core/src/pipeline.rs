//! Generation pipeline
//!
//! [`Generator`] runs a [`Job`] under a root directory: copy, then rename,
//! then substitute. Stages can be selected individually with [`StageSet`],
//! e.g. to re-run only the substitution pass on an already renamed tree.

use crate::config::{GenerationConfig, Job};
use crate::error::{GenError, GenResult};
use crate::hash::TreeFingerprint;
use crate::report::{GenerationReport, VerifyReport};
use crate::tree;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Copy source tree over target tree
    Copy,
    /// Swap file-name prefixes
    Rename,
    /// Apply the substitution table
    Substitute,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Copy, Stage::Rename, Stage::Substitute];

    /// Stage name as used on the command line
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Stage::Copy => "copy",
            Stage::Rename => "rename",
            Stage::Substitute => "substitute",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage '{s}' (expected copy, rename or substitute)"))
    }
}

/// Set of stages to run; execution order is always copy, rename, substitute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSet {
    copy: bool,
    rename: bool,
    substitute: bool,
}

impl StageSet {
    /// Every stage
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self {
            copy: true,
            rename: true,
            substitute: true,
        }
    }

    /// No stage
    #[inline]
    #[must_use]
    pub const fn none() -> Self {
        Self {
            copy: false,
            rename: false,
            substitute: false,
        }
    }

    /// With a stage enabled
    #[inline]
    #[must_use]
    pub const fn with(mut self, stage: Stage) -> Self {
        match stage {
            Stage::Copy => self.copy = true,
            Stage::Rename => self.rename = true,
            Stage::Substitute => self.substitute = true,
        }
        self
    }

    /// Check if stage is enabled
    #[inline]
    #[must_use]
    pub const fn contains(&self, stage: Stage) -> bool {
        match stage {
            Stage::Copy => self.copy,
            Stage::Rename => self.rename,
            Stage::Substitute => self.substitute,
        }
    }

    /// Check if no stage is enabled
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.copy || self.rename || self.substitute)
    }
}

impl Default for StageSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Stage> for StageSet {
    fn from_iter<I: IntoIterator<Item = Stage>>(iter: I) -> Self {
        iter.into_iter().fold(Self::none(), Self::with)
    }
}

/// Runs jobs of a [`GenerationConfig`]
#[derive(Debug, Clone)]
pub struct Generator {
    config: GenerationConfig,
    stages: StageSet,
}

impl Generator {
    /// Create generator running every stage
    #[inline]
    #[must_use]
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            stages: StageSet::all(),
        }
    }

    /// With a stage selection
    #[inline]
    #[must_use]
    pub fn with_stages(mut self, stages: StageSet) -> Self {
        self.stages = stages;
        self
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Root directory jobs run under
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Look up a job by name
    ///
    /// # Errors
    /// Returns [`GenError::UnknownJob`] if no job has that name
    pub fn job(&self, name: &str) -> GenResult<&Job> {
        self.config
            .job(name)
            .ok_or_else(|| GenError::UnknownJob(name.to_string()))
    }

    /// Run every configured job in order
    ///
    /// Stops at the first failing job.
    ///
    /// # Errors
    /// Returns the first job's error
    pub fn run_all(&self) -> GenResult<Vec<GenerationReport>> {
        self.config.jobs.iter().map(|job| self.run(job)).collect()
    }

    /// Run a job by name
    ///
    /// # Errors
    /// Returns [`GenError::UnknownJob`] or any stage error
    pub fn run_named(&self, name: &str) -> GenResult<GenerationReport> {
        self.run(self.job(name)?)
    }

    /// Run the selected stages of one job
    ///
    /// # Errors
    /// Returns the first stage error; later stages do not run
    pub fn run(&self, job: &Job) -> GenResult<GenerationReport> {
        job.validate()?;
        let source_dir = job.source_dir(self.root());
        let target_dir = job.target_dir(self.root());
        tracing::info!("Running job '{}' ({})", job.name, target_dir.display());

        for hazard in job.table.chain_hazards() {
            tracing::warn!("Job '{}': table {}", job.name, hazard);
        }

        let copied = if self.stages.contains(Stage::Copy) {
            Some(tree::copy_tree(&source_dir, &target_dir)?)
        } else {
            None
        };

        let renamed = if self.stages.contains(Stage::Rename) {
            tree::rename_prefixed(&target_dir, &job.prefix)?
        } else {
            Vec::new()
        };

        let substitution = if self.stages.contains(Stage::Substitute) {
            Some(tree::substitute_contents(&target_dir, &job.prefix, &job.table)?)
        } else {
            None
        };

        let fingerprint = TreeFingerprint::of_tree(&target_dir)?;
        tracing::info!("Job '{}' done, output {}", job.name, fingerprint);

        Ok(GenerationReport {
            job: job.name.clone(),
            target_dir,
            copied,
            renamed,
            substitution,
            fingerprint,
        })
    }

    /// Check a generated tree for leftover prefixes and patterns
    ///
    /// # Errors
    /// Returns error if the generated tree is missing or unreadable
    pub fn verify(&self, job: &Job) -> GenResult<VerifyReport> {
        let target_dir: PathBuf = job.target_dir(self.root());
        tracing::info!("Verifying: {}", target_dir.display());
        let (unrenamed, residuals) = tree::find_residuals(&target_dir, &job.prefix, &job.table)?;
        Ok(VerifyReport {
            job: job.name.clone(),
            unrenamed,
            residuals,
        })
    }
}
