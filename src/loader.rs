//! Dynamic loading and slot binding for built artifacts.
//!
//! Loaded modules are process-wide, shared, mutable state: dlopen returns
//! the same resident module for a given path no matter how many times it is
//! opened, so the exported variable slots are one set of storage per
//! artifact, not per call. Two consequences shape this module:
//!
//! - Handles are immortal. A `Library` is never dropped once loaded;
//!   re-loading a path under a new identity within one process is unsound,
//!   and values may outlive any single evaluation. The registry keeps every
//!   handle alive for the life of the process.
//! - Every evaluation holds the artifact's gate for the whole bind-then-
//!   invoke window, so one call's overrides cannot be clobbered by another
//!   before its entry point reads them.

use libloading::Library;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::abi::{RawText, RawValue, TAG_STR};
use crate::codegen::{ENTRY_POINT, RELEASE_HOOK};
use crate::error::EvalError;
use crate::value::{Value, Var, VarType};

type EntryFn = unsafe extern "C" fn() -> RawValue;
type ReleaseFn = unsafe extern "C" fn(RawValue);

/// A loaded artifact and its evaluation gate.
pub struct LoadedModule {
    library: Library,
    gate: Mutex<()>,
}

static LOADED: OnceLock<Mutex<HashMap<PathBuf, Arc<LoadedModule>>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<PathBuf, Arc<LoadedModule>>> {
    LOADED.get_or_init(|| Mutex::new(HashMap::new()))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Load the artifact at `path`, or return the already-resident handle.
pub fn load_module(path: &Path) -> Result<Arc<LoadedModule>, EvalError> {
    let mut map = lock(registry());
    if let Some(module) = map.get(path) {
        return Ok(module.clone());
    }
    let library = unsafe { Library::new(path) }
        .map_err(|e| EvalError::load_failed(path.display().to_string(), e.to_string()))?;
    let module = Arc::new(LoadedModule {
        library,
        gate: Mutex::new(()),
    });
    map.insert(path.to_path_buf(), module.clone());
    Ok(module)
}

/// Bind the overrides into the loaded artifact's exported slots, invoke the
/// entry point, and decode its result.
///
/// Override iteration order is insignificant: each assignment targets a
/// distinct named slot. Slots not named in `overrides` keep whatever they
/// currently hold: the declared default on a freshly loaded module, or the
/// last value a previous call wrote.
pub fn execute(
    path: &Path,
    variables: &BTreeMap<String, Var>,
    overrides: &BTreeMap<String, Value>,
) -> Result<Value, EvalError> {
    if !path.exists() {
        return Err(EvalError::artifact_missing(path.display().to_string()));
    }

    let module = load_module(path)?;
    let _gate = lock(&module.gate);

    for (name, value) in overrides {
        bind_slot(&module.library, variables, name, value)?;
    }

    let entry: libloading::Symbol<'_, EntryFn> =
        unsafe { module.library.get(ENTRY_POINT.as_bytes()) }
            .map_err(|_| EvalError::entry_point_missing(path.display().to_string()))?;
    let raw = unsafe { entry() };
    let result = raw.decode();

    // String results were allocated by the module; give the storage back to
    // the allocator that produced it now that the bytes are copied out.
    if raw.tag == TAG_STR {
        if let Ok(release) =
            unsafe { module.library.get::<ReleaseFn>(RELEASE_HOOK.as_bytes()) }
        {
            unsafe { release(raw) };
        }
    }

    Ok(result)
}

/// Store one override into the exported slot of the same name.
///
/// The slot must exist as an exported symbol, and the value's dynamic kind
/// must match the slot's declared type; either failure is an ordinary
/// binding error and no write happens. The kind check is what keeps the raw
/// write sound: a `float64` slot is only ever written through a `*mut f64`,
/// and so on for each declarable type.
fn bind_slot(
    library: &Library,
    variables: &BTreeMap<String, Var>,
    name: &str,
    value: &Value,
) -> Result<(), EvalError> {
    let slot: libloading::Symbol<'_, *mut u8> = unsafe { library.get(name.as_bytes()) }
        .map_err(|_| EvalError::unknown_variable(name))?;
    let addr: *mut u8 = *slot;

    let declared = variables
        .get(name)
        .and_then(|var| VarType::parse(&var.ty))
        .ok_or_else(|| EvalError::unknown_variable(name))?;

    unsafe {
        match (declared, value) {
            (VarType::Int, Value::Int(v)) => addr.cast::<i64>().write(*v),
            (VarType::Float, Value::Float(v)) => addr.cast::<f64>().write(*v),
            (VarType::Bool, Value::Bool(v)) => addr.cast::<bool>().write(*v),
            (VarType::Str, Value::Str(v)) => {
                // The module reads the slot's ptr+len at arbitrary later
                // times and the module itself is immortal, so the pointee
                // must be too.
                let text: &'static str = Box::leak(v.clone().into_boxed_str());
                addr.cast::<RawText>().write(RawText {
                    ptr: text.as_ptr(),
                    len: text.len(),
                });
            }
            (declared, value) => {
                return Err(EvalError::value_type_mismatch(
                    name,
                    value.to_string(),
                    value.kind_name(),
                    declared.name(),
                ));
            }
        }
    }

    Ok(())
}
