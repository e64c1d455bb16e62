//! Source rendering for evaluation units.
//!
//! Generation is a pure function of unit state: the registries are ordered
//! collections, so byte-identical source comes out no matter what order the
//! caller registered things in. That determinism is what makes the content
//! digest a usable cache key.
//!
//! The emitted unit is freestanding; it compiles under plain `rustc` with
//! no external crates. Layout, in order: lint allowances, the caller's
//! imports, the ABI prelude (`Text` string slots, the `repr(C)` result
//! `Value`, the release hook), helper functions, exported variable slots,
//! and the `Evaluate` entry point wrapping the caller's body.

use crate::error::EvalError;
use crate::evaluation::{EvalKind, Evaluation};
use crate::value::{Value, VarType};

/// Name of the generated no-argument entry point.
pub const ENTRY_POINT: &str = "Evaluate";

/// Exported hook that returns string-result storage to the module's
/// allocator.
pub const RELEASE_HOOK: &str = "__eval_value_release";

/// Fixed ABI shared between the generated unit and the host.
///
/// `Text` and `Value` here must stay field-for-field identical to
/// `abi::RawText` and `abi::RawValue`.
const PRELUDE: &str = r#"#[repr(C)]
#[derive(Clone, Copy)]
pub struct Text {
    ptr: *const u8,
    len: usize,
}

impl Text {
    pub const fn from_literal(s: &'static str) -> Text {
        Text { ptr: s.as_ptr(), len: s.len() }
    }

    pub const fn empty() -> Text {
        Text { ptr: std::ptr::null(), len: 0 }
    }

    pub fn as_str(&self) -> &str {
        if self.ptr.is_null() {
            return "";
        }
        unsafe { std::str::from_utf8_unchecked(std::slice::from_raw_parts(self.ptr, self.len)) }
    }
}

impl std::fmt::Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[repr(C)]
pub struct Value {
    tag: u8,
    int_val: i64,
    float_val: f64,
    bool_val: u8,
    str_ptr: *mut u8,
    str_len: usize,
    str_cap: usize,
}

impl Value {
    pub const fn unit() -> Value {
        Value {
            tag: 0,
            int_val: 0,
            float_val: 0.0,
            bool_val: 0,
            str_ptr: std::ptr::null_mut(),
            str_len: 0,
            str_cap: 0,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        let mut out = Value::unit();
        out.tag = 1;
        out.int_val = v;
        out
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        let mut out = Value::unit();
        out.tag = 2;
        out.float_val = v;
        out
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        let mut out = Value::unit();
        out.tag = 3;
        out.bool_val = v as u8;
        out
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        let mut bytes = v.into_bytes();
        let mut out = Value::unit();
        out.tag = 4;
        out.str_ptr = bytes.as_mut_ptr();
        out.str_len = bytes.len();
        out.str_cap = bytes.capacity();
        std::mem::forget(bytes);
        out
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::from(v.to_string())
    }
}

impl From<Text> for Value {
    fn from(v: Text) -> Value {
        Value::from(v.as_str().to_string())
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Value {
        Value::unit()
    }
}

#[no_mangle]
pub extern "C" fn __eval_value_release(value: Value) {
    if value.tag == 4 && !value.str_ptr.is_null() {
        unsafe { drop(Vec::from_raw_parts(value.str_ptr, value.str_len, value.str_cap)) }
    }
}
"#;

/// Render the unit into one freestanding compilation unit.
///
/// Fails without rendering anything when the evaluation kind is the
/// reserved complex mode, when a variable name is not exported-style
/// (first character uppercase), or when a type descriptor is outside the
/// supported set.
pub fn render(unit: &Evaluation) -> Result<String, EvalError> {
    if unit.kind == EvalKind::Complex {
        return Err(EvalError::unsupported_mode("complex"));
    }

    let mut source = String::new();

    // The generated unit deliberately uses uppercase statics and an
    // uppercase entry-point name; most of the prelude is unused by any
    // given body.
    source.push_str(
        "#![allow(non_snake_case, non_upper_case_globals, dead_code, unused_imports, \
         unused_unsafe, unknown_lints, static_mut_refs)]\n\n",
    );

    for import in &unit.imports {
        let import = import.trim();
        if import.is_empty() {
            continue;
        }
        source.push_str(&format!("use {};\n", import));
    }
    if !unit.imports.is_empty() {
        source.push('\n');
    }

    source.push_str(PRELUDE);
    source.push('\n');

    for func in unit.functions.values() {
        let body = func.source.trim();
        if func.name.is_empty() || body.is_empty() {
            continue;
        }
        source.push_str(body);
        source.push_str("\n\n");
    }

    for var in unit.variables.values() {
        if var.name.is_empty() || var.ty.is_empty() {
            continue;
        }
        let first = var.name.chars().next().unwrap_or_default();
        let corrected: String = first
            .to_uppercase()
            .chain(var.name.chars().skip(1))
            .collect();
        if corrected != var.name {
            return Err(EvalError::unexported_variable(&var.name, corrected));
        }
        let ty = VarType::parse(&var.ty)
            .ok_or_else(|| EvalError::unknown_var_type(&var.name, &var.ty))?;
        // String slots are `Text`, so their quoted default needs the const
        // constructor around it. Everything else is a plain literal; a
        // default whose kind contradicts the declared type is left for the
        // compiler to report.
        let literal = match var.default.as_ref() {
            Some(Value::Str(s)) if ty == VarType::Str => {
                format!("Text::from_literal({:?})", s)
            }
            Some(v) => v
                .literal()
                .unwrap_or_else(|| ty.zero_literal().to_string()),
            None => ty.zero_literal().to_string(),
        };
        source.push_str(&format!(
            "#[no_mangle]\npub static mut {}: {} = {};\n",
            var.name,
            ty.rust_type(),
            literal
        ));
    }
    if !unit.variables.is_empty() {
        source.push('\n');
    }

    source.push_str(&format!(
        "#[no_mangle]\npub extern \"C\" fn {}() -> Value {{\n    unsafe {{\n{}\n    }}\n}}\n",
        ENTRY_POINT, unit.body
    ));

    Ok(source)
}
