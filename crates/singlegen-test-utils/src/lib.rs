//! Testing utilities for singlegen workspace
//!
//! On-disk fixture trees laid out like the JPOWER sources.

#![allow(missing_docs)]

use singlegen_core::{GenerationConfig, Job};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

pub const NEWTONPF_SOURCE: &str = r#"package edu.cornell.pserc.jpower.tdouble.pf;

import cern.colt.matrix.tdouble.DoubleFactory1D;
import cern.colt.matrix.tdouble.DoubleMatrix1D;
import cern.colt.matrix.tdouble.DoubleMatrix2D;
import cern.colt.matrix.tdouble.algo.SparseDoubleAlgebra;
import cern.jet.math.tdouble.DoubleFunctions;
import edu.cornell.pserc.jpower.tdouble.Djp_jpoption;

public class Djp_newtonpf {

	private static final DoubleFunctions dfunc = DoubleFunctions.functions;

	public static DoubleMatrix1D jp_newtonpf(DoubleMatrix2D J, DoubleMatrix1D F) {
		double tol = Djp_jpoption.jp_jpoption().get("PF_TOL");
		return SparseDoubleAlgebra.DEFAULT.solve(J, F.assign(dfunc.neg));
	}
}
"#;

pub const NEWTONPF_EXPECTED: &str = r#"package edu.cornell.pserc.jpower.tfloat.pf;

import cern.colt.matrix.tfloat.DoubleFactory1D;
import cern.colt.matrix.tfloat.FloatMatrix1D;
import cern.colt.matrix.tfloat.FloatMatrix2D;
import cern.colt.matrix.tfloat.algo.SparseFloatAlgebra;
import cern.jet.math.tfloat.FloatFunctions;
import edu.cornell.pserc.jpower.tfloat.Sjp_jpoption;

public class Sjp_newtonpf {

	private static final FloatFunctions sfunc = FloatFunctions.functions;

	public static FloatMatrix1D jp_newtonpf(FloatMatrix2D J, FloatMatrix1D F) {
		double tol = Sjp_jpoption.jp_jpoption().get("PF_TOL");
		return SparseFloatAlgebra.DEFAULT.solve(J, F.assign(sfunc.neg));
	}
}
"#;

pub const JPOPTION_SOURCE: &str = "package edu.cornell.pserc.jpower.tdouble;\n\npublic class Djp_jpoption {}\n";

pub const PACKAGE_INFO: &str = "/** Double precision JPOWER. Uses DoubleMatrix1D. */\npackage edu.cornell.pserc.jpower.tdouble;\n";

/// Scratch directory that is removed on drop
pub struct FixtureTree {
    dir: TempDir,
}

impl FixtureTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories
    pub fn write(&self, rel: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn read(&self, rel: impl AsRef<Path>) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        self.root().join(rel).exists()
    }

    /// Sorted `/`-separated paths of all files under `rel`
    pub fn list_files(&self, rel: impl AsRef<Path>) -> Vec<String> {
        let base = self.root().join(rel);
        WalkDir::new(&base)
            .sort_by_file_name()
            .into_iter()
            .map(Result::unwrap)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(&base)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect()
    }
}

impl Default for FixtureTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in config rooted at `root`
pub fn jpower_config(root: &Path) -> GenerationConfig {
    GenerationConfig::default().with_root(root)
}

/// Source directory of the built-in job, relative to the fixture root
pub fn jpower_source_rel() -> PathBuf {
    Job::jpower().source_dir(Path::new(""))
}

/// Target directory of the built-in job, relative to the fixture root
pub fn jpower_target_rel() -> PathBuf {
    Job::jpower().target_dir(Path::new(""))
}

/// Small `tdouble` tree for the built-in job
///
/// ```text
/// edu/cornell/pserc/jpower/tdouble/
///   Djp_jpoption.java
///   package-info.java
///   pf/Djp_newtonpf.java
///   cases/case4gs.m        (not prefixed)
/// ```
pub fn jpower_fixture() -> FixtureTree {
    let tree = FixtureTree::new();
    let src = jpower_source_rel();
    tree.write(src.join("Djp_jpoption.java"), JPOPTION_SOURCE);
    tree.write(src.join("package-info.java"), PACKAGE_INFO);
    tree.write(src.join("pf").join("Djp_newtonpf.java"), NEWTONPF_SOURCE);
    tree.write(src.join("cases").join("case4gs.m"), "% DoubleMatrix2D in a data file\n");
    tree
}
