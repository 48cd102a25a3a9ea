//! singlegen core
//!
//! Derives the single-precision variant of a source tree from its
//! double-precision original by plain text manipulation.
//!
//! # Pipeline
//!
//! ```text
//! tdouble/ ──copy──► tfloat/ ──rename D*→S*──► tfloat/ ──substitute──► tfloat/
//!                                                   ↑
//!                                           SubstitutionTable (ordered)
//! ```
//!
//! Replacements are literal substrings. Nothing here understands the syntax
//! of the files being rewritten, and the output is not checked for
//! correctness.
//!
//! # Example
//!
//! ```rust,no_run
//! use singlegen_core::{GenerationConfig, Generator};
//!
//! # fn example() -> Result<(), singlegen_core::GenError> {
//! let generator = Generator::new(GenerationConfig::default());
//! let report = generator.run_named("jpower")?;
//! println!("{}", report.generate_text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod hash;
pub mod pipeline;
pub mod prefix;
pub mod report;
pub mod table;
pub mod tree;

pub use config::{GenerationConfig, Job, DEFAULT_JOB, DEFAULT_ROOT};
pub use error::{ConfigError, GenError, GenResult};
pub use hash::{ContentHash, TreeFingerprint};
pub use pipeline::{Generator, Stage, StageSet};
pub use prefix::FilePrefix;
pub use report::{GenerationReport, Residual, VerifyReport};
pub use table::{ChainHazard, HazardKind, Replacement, SubstitutionTable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
