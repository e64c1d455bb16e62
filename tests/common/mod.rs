//! Shared helpers for the dyneval test suite.
//!
//! End-to-end tests compile real artifacts, so every test builds under its
//! own uniquely-named unit: a stale cache from a previous run can never
//! alias a fresh build.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dyneval::{Evaluation, Var};

/// Base directory all test builds land under.
pub fn test_base() -> PathBuf {
    std::env::temp_dir().join("dyneval-tests")
}

/// A unit name no previous run can have built before.
pub fn unique_name(label: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!(
        "{} {} {}",
        label,
        nanos,
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

/// The canonical unit used across the suite: `A: int` with no default,
/// `B: float64` defaulting to `10.5`, body `A as f64 + B`.
pub fn simple_unit(label: &str) -> Evaluation {
    let mut eval = Evaluation::with_name(unique_name(label));
    eval.set_base_build_path(test_base());
    eval.define_variable(Var::new("A", "int"));
    eval.define_variable(Var::with_default("B", "float64", 10.5));
    eval.prepare("let c = A as f64 + B; Value::from(c)");
    eval
}
