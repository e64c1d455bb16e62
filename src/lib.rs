//! # dyneval - formula evaluation through generated native modules
//!
//! Describe a small computation as data (a name, typed input variables
//! with optional defaults, module imports, helper functions, and a body of
//! Rust source) and dyneval turns it into a callable unit: it generates a
//! freestanding compilation unit, compiles it as a loadable module with
//! `rustc`, caches the artifact by content digest, loads it into the
//! running process, binds caller-supplied override values into the module's
//! exported slots by name, invokes the `Evaluate` entry point, and returns
//! its result.
//!
//! ## Quick Start
//!
//! ```no_run
//! use dyneval::{Evaluation, Overrides, Value, Var};
//!
//! let mut eval = Evaluation::with_name("simple operation");
//! eval.define_variable(Var::new("A", "int"));
//! eval.define_variable(Var::with_default("B", "float64", 10.5));
//! eval.prepare("let c = A as f64 + B; Value::from(c)");
//! eval.build().unwrap();
//!
//! let result = eval
//!     .evaluate(&Overrides::from([("A".to_string(), Value::Int(9))]))
//!     .unwrap();
//! assert_eq!(result, Value::Float(19.5));
//! ```
//!
//! ## Pipeline
//!
//! 1. **Generate** - `codegen` renders the registries and body into one
//!    deterministic source unit; identical unit state yields byte-identical
//!    source regardless of registration order.
//! 2. **Build or reuse** - `build` addresses the artifact by a SHA-256
//!    digest of the source; a matching artifact on disk is reused without
//!    invoking the compiler.
//! 3. **Load, bind, invoke** - `loader` loads the artifact (once per path,
//!    process-wide), writes overrides into the exported slots with a
//!    type-kind check per write, and calls the entry point.
//!
//! Failures at every stage come back as [`EvalError`] values grouped by
//! [`ErrorKind`]; nothing panics across the public boundary.

pub mod abi;
pub mod build;
pub mod codegen;
pub mod error;
pub mod evaluation;
pub mod loader;
pub mod value;

pub use error::{ErrorKind, EvalError};
pub use evaluation::{EvalKind, Evaluation, Overrides};
pub use value::{Func, Value, Var, VarType};
