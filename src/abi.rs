//! Host-side mirror of the generated module's C-layout types.
//!
//! The generated unit defines `Text` and `Value` in its prelude (see
//! `codegen`); the structs here must match those definitions field for
//! field. Both sides are compiled by the same toolchain for the same
//! target, so identical `repr(C)` declarations guarantee identical layout.

use crate::value::Value;

pub const TAG_UNIT: u8 = 0;
pub const TAG_INT: u8 = 1;
pub const TAG_FLOAT: u8 = 2;
pub const TAG_BOOL: u8 = 3;
pub const TAG_STR: u8 = 4;

/// A string slot: pointer and length of UTF-8 bytes the slot does not own.
///
/// Mirrors the prelude's `Text`. The binder writes these into string slots;
/// the pointee must outlive the loaded module (in practice both are
/// immortal, see `loader`).
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawText {
    pub ptr: *const u8,
    pub len: usize,
}

/// The entry point's return value. Mirrors the prelude's `Value`.
///
/// String payloads are owned by the module's allocator; after copying the
/// bytes out, hand the value back through the module's exported
/// `__eval_value_release` so the storage is freed where it was allocated.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawValue {
    pub tag: u8,
    pub int_val: i64,
    pub float_val: f64,
    pub bool_val: u8,
    pub str_ptr: *mut u8,
    pub str_len: usize,
    pub str_cap: usize,
}

impl RawValue {
    /// Decode into a host value, copying any string payload.
    pub fn decode(&self) -> Value {
        match self.tag {
            TAG_INT => Value::Int(self.int_val),
            TAG_FLOAT => Value::Float(self.float_val),
            TAG_BOOL => Value::Bool(self.bool_val != 0),
            TAG_STR => {
                if self.str_ptr.is_null() {
                    Value::Str(String::new())
                } else {
                    let bytes =
                        unsafe { std::slice::from_raw_parts(self.str_ptr, self.str_len) };
                    Value::Str(String::from_utf8_lossy(bytes).into_owned())
                }
            }
            _ => Value::Unit,
        }
    }
}
