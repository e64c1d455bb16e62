//! Typed errors for the generate, build, load, bind, invoke pipeline.
//!
//! Every failure surfaces as one `EvalError` variant; `kind()` groups the
//! variants into the four recovery classes callers branch on. Nothing in the
//! crate panics across the public boundary; a type-mismatched binding in
//! particular is an ordinary error value, never a fault.

use std::error::Error as StdError;
use std::fmt;

/// Recovery class of an error.
///
/// Configuration errors fail fast before any I/O. Build errors carry the
/// compiler's own diagnostics and are recoverable by fixing the unit and
/// rebuilding. Load errors are recoverable by rebuilding. Binding errors are
/// per-call and leave the artifact intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Build,
    Load,
    Binding,
}

/// Typed error for evaluation units.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    // Configuration
    NameMissing,
    FormulaMissing,
    UnsupportedMode {
        mode: String,
    },
    UnexportedVariable {
        name: String,
        corrected: String,
    },
    UnknownVarType {
        variable: String,
        descriptor: String,
    },

    // Build
    UnsupportedPlatform {
        os: String,
    },
    BuildDirectory {
        path: String,
        reason: String,
    },
    CompilerSpawn {
        command: String,
        reason: String,
    },
    CompileFailed {
        reason: String,
        output: String,
    },

    // Load
    NotBuilt,
    ArtifactMissing {
        path: String,
    },
    LoadFailed {
        path: String,
        reason: String,
    },
    EntryPointMissing {
        path: String,
    },

    // Binding
    UnknownVariable {
        name: String,
    },
    ValueTypeMismatch {
        variable: String,
        value: String,
        supplied: String,
        declared: String,
    },
}

impl EvalError {
    pub fn unsupported_mode(mode: impl Into<String>) -> Self {
        EvalError::UnsupportedMode { mode: mode.into() }
    }

    pub fn unexported_variable(name: impl Into<String>, corrected: impl Into<String>) -> Self {
        EvalError::UnexportedVariable {
            name: name.into(),
            corrected: corrected.into(),
        }
    }

    pub fn unknown_var_type(variable: impl Into<String>, descriptor: impl Into<String>) -> Self {
        EvalError::UnknownVarType {
            variable: variable.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn unsupported_platform(os: impl Into<String>) -> Self {
        EvalError::UnsupportedPlatform { os: os.into() }
    }

    pub fn build_directory(path: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::BuildDirectory {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn compiler_spawn(command: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::CompilerSpawn {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn compile_failed(reason: impl Into<String>, output: impl Into<String>) -> Self {
        EvalError::CompileFailed {
            reason: reason.into(),
            output: output.into(),
        }
    }

    pub fn artifact_missing(path: impl Into<String>) -> Self {
        EvalError::ArtifactMissing { path: path.into() }
    }

    pub fn load_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::LoadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn entry_point_missing(path: impl Into<String>) -> Self {
        EvalError::EntryPointMissing { path: path.into() }
    }

    pub fn unknown_variable(name: impl Into<String>) -> Self {
        EvalError::UnknownVariable { name: name.into() }
    }

    pub fn value_type_mismatch(
        variable: impl Into<String>,
        value: impl Into<String>,
        supplied: impl Into<String>,
        declared: impl Into<String>,
    ) -> Self {
        EvalError::ValueTypeMismatch {
            variable: variable.into(),
            value: value.into(),
            supplied: supplied.into(),
            declared: declared.into(),
        }
    }

    /// Recovery class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::NameMissing
            | EvalError::FormulaMissing
            | EvalError::UnsupportedMode { .. }
            | EvalError::UnexportedVariable { .. }
            | EvalError::UnknownVarType { .. } => ErrorKind::Configuration,
            EvalError::UnsupportedPlatform { .. }
            | EvalError::BuildDirectory { .. }
            | EvalError::CompilerSpawn { .. }
            | EvalError::CompileFailed { .. } => ErrorKind::Build,
            EvalError::NotBuilt
            | EvalError::ArtifactMissing { .. }
            | EvalError::LoadFailed { .. }
            | EvalError::EntryPointMissing { .. } => ErrorKind::Load,
            EvalError::UnknownVariable { .. } | EvalError::ValueTypeMismatch { .. } => {
                ErrorKind::Binding
            }
        }
    }

    /// Human-readable description of the error.
    pub fn description(&self) -> String {
        match self {
            EvalError::NameMissing => "name is mandatory".to_string(),
            EvalError::FormulaMissing => "evaluation formula cannot be empty".to_string(),
            EvalError::UnsupportedMode { mode } => {
                format!("{} evaluation is not supported yet", mode)
            }
            EvalError::UnexportedVariable { name, corrected } => {
                format!(
                    "defined variable must be exported: {} must be {}",
                    name, corrected
                )
            }
            EvalError::UnknownVarType {
                variable,
                descriptor,
            } => {
                format!(
                    "variable {} has an unknown type descriptor '{}'",
                    variable, descriptor
                )
            }
            EvalError::UnsupportedPlatform { os } => {
                format!("unsupported operating system: {}", os)
            }
            EvalError::BuildDirectory { path, reason } => {
                format!("failed to prepare build directory {}: {}", path, reason)
            }
            EvalError::CompilerSpawn { command, reason } => {
                format!("failed to run '{}': {}", command, reason)
            }
            EvalError::CompileFailed { reason, output } => {
                format!("{}: {}", reason, output)
            }
            EvalError::NotBuilt => {
                "no build artifact; build the formula first".to_string()
            }
            EvalError::ArtifactMissing { path } => {
                format!("build artifact {} not found; rebuild the formula", path)
            }
            EvalError::LoadFailed { path, reason } => {
                format!("failed to load {}: {}", path, reason)
            }
            EvalError::EntryPointMissing { path } => {
                format!("entry point Evaluate not found in {}", path)
            }
            EvalError::UnknownVariable { name } => {
                format!("unknown variable {}", name)
            }
            EvalError::ValueTypeMismatch {
                variable,
                value,
                supplied,
                declared,
            } => {
                format!(
                    "Error on setting value of variable {} (type {}) with value {} (type {})",
                    variable, supplied, value, declared
                )
            }
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl StdError for EvalError {}
