//! The evaluation unit: configuration, build, evaluate.
//!
//! An `Evaluation` moves through `Unconfigured → Configured → Built →
//! Evaluated*`: configure the registries and body, `build()` to produce or
//! reuse a compiled artifact, then `evaluate()` any number of times against
//! that artifact with different override maps.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::{Path, PathBuf};

use crate::build;
use crate::codegen;
use crate::error::EvalError;
use crate::loader;
use crate::value::{Func, Value, Var};

/// Directory under the platform temp location that holds build artifacts by
/// default.
const DEFAULT_BUILD_DIR: &str = "dyneval-plugins";

/// How the body text is interpreted. `Complex` is reserved and rejected at
/// build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalKind {
    Simple,
    Complex,
}

/// Override values supplied per `evaluate` call, keyed by variable name.
pub type Overrides = BTreeMap<String, Value>;

/// A named, configurable description of one computation.
pub struct Evaluation {
    pub(crate) name: String,
    pub(crate) variables: BTreeMap<String, Var>,
    pub(crate) functions: BTreeMap<String, Func>,
    pub(crate) imports: BTreeSet<String>,
    pub(crate) body: String,
    pub(crate) kind: EvalKind,
    base_build_path: PathBuf,

    /// When set (the default), a build whose generated source matches an
    /// existing artifact reuses it without invoking the compiler.
    pub reuse_cached_build: bool,

    generated: Option<String>,
    build_dir: Option<PathBuf>,
    artifact: Option<PathBuf>,
}

impl Evaluation {
    pub fn new() -> Self {
        Evaluation {
            name: String::new(),
            variables: BTreeMap::new(),
            functions: BTreeMap::new(),
            imports: BTreeSet::new(),
            body: String::new(),
            kind: EvalKind::Simple,
            base_build_path: env::temp_dir().join(DEFAULT_BUILD_DIR),
            reuse_cached_build: true,
            generated: None,
            build_dir: None,
            artifact: None,
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        let mut eval = Evaluation::new();
        eval.set_name(name);
        eval
    }

    /// Set the evaluation name. Required before `build`; its sanitized form
    /// names the build directory and artifact.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Override the base build path. Artifacts land under
    /// `<base>/<sanitized name>/`.
    pub fn set_base_build_path(&mut self, path: impl Into<PathBuf>) {
        self.base_build_path = path.into();
    }

    /// Register a module import for the generated unit. Imports accumulate
    /// as a set; duplicates collapse.
    pub fn import(&mut self, path: impl Into<String>) {
        self.imports.insert(path.into());
    }

    /// Declare a variable. Keyed by name; redeclaring replaces the previous
    /// declaration. No validation happens here; names and type descriptors
    /// are checked at generation time, so registration order never matters.
    pub fn define_variable(&mut self, var: Var) {
        self.variables.insert(var.name.clone(), var);
    }

    /// Register a reusable helper emitted into the generated unit. Keyed by
    /// name; redefining replaces the previous helper.
    pub fn define_function(&mut self, func: Func) {
        self.functions.insert(func.name.clone(), func);
    }

    /// Set the body text for simple evaluation. Surrounding whitespace is
    /// trimmed; the body is otherwise handed verbatim to the compiler and
    /// is responsible for producing the entry point's result value.
    pub fn prepare(&mut self, body: impl AsRef<str>) {
        self.kind = EvalKind::Simple;
        self.body = body.as_ref().trim().to_string();
    }

    /// Select the reserved complex evaluation mode. Building such a unit
    /// fails with an unsupported-mode error.
    pub fn prepare_complex(&mut self, body: impl AsRef<str>) {
        self.kind = EvalKind::Complex;
        self.body = body.as_ref().trim().to_string();
    }

    /// Render the generated source for the current unit state without
    /// touching the filesystem.
    pub fn generate(&self) -> Result<String, EvalError> {
        codegen::render(self)
    }

    /// Generate source and produce the compiled artifact, reusing a cached
    /// artifact when the content digest already has one.
    ///
    /// Builds of one unit are serialized by `&mut self`; builds of units
    /// with distinct artifact paths are independent.
    pub fn build(&mut self) -> Result<(), EvalError> {
        if self.name.is_empty() {
            return Err(EvalError::NameMissing);
        }
        if self.body.is_empty() {
            return Err(EvalError::FormulaMissing);
        }

        let source = codegen::render(self)?;
        let layout = build::layout_for(&self.base_build_path, &self.name, &source);
        build::build_artifact(&layout, &source, self.reuse_cached_build)?;

        self.generated = Some(source);
        self.build_dir = Some(layout.build_dir);
        self.artifact = Some(layout.artifact);
        Ok(())
    }

    /// Execute the built artifact with the given overrides and return the
    /// entry point's result.
    ///
    /// Repeatable: slots not named in `overrides` keep whatever they held
    /// after the previous call on the same loaded artifact (their declared
    /// default on the first call). Calls against one artifact are
    /// serialized internally; see `loader`.
    pub fn evaluate(&self, overrides: &Overrides) -> Result<Value, EvalError> {
        let artifact = match &self.artifact {
            Some(path) => path,
            None => return Err(EvalError::NotBuilt),
        };
        loader::execute(artifact, &self.variables, overrides)
    }

    /// Generated source from the last successful `build`.
    pub fn generated_source(&self) -> Option<&str> {
        self.generated.as_deref()
    }

    /// Build directory from the last successful `build`.
    pub fn build_dir(&self) -> Option<&Path> {
        self.build_dir.as_deref()
    }

    /// Artifact path from the last successful `build`.
    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }
}

impl Default for Evaluation {
    fn default() -> Self {
        Evaluation::new()
    }
}
