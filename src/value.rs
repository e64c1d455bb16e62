//! Dynamically-typed scalar values and the declarations that carry them.
//!
//! `Value` is the currency of the whole pipeline: variable defaults at
//! generation time, override maps at evaluation time, and the result that
//! comes back from a loaded module's entry point.

use std::fmt;

/// A dynamically-typed scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unit,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Name of this value's dynamic kind, as it appears in binding errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unit => "unit",
            Value::Int(_) => "int",
            Value::Float(_) => "float64",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
        }
    }

    /// Render this value as a source literal for the generated unit.
    ///
    /// Textual values are quoted and escaped; floats always carry a
    /// fractional point so the literal stays a valid `f64` expression.
    /// `Unit` has no literal form and renders as `None`.
    pub fn literal(&self) -> Option<String> {
        match self {
            Value::Unit => None,
            Value::Int(v) => Some(v.to_string()),
            Value::Float(v) => Some(format!("{:?}", v)),
            Value::Bool(v) => Some(v.to_string()),
            Value::Str(v) => Some(format!("{:?}", v)),
        }
    }

    pub fn as_int(&self) -> Result<i64, String> {
        match self {
            Value::Int(v) => Ok(*v),
            _ => Err(format!("Expected int, got {}", self.kind_name())),
        }
    }

    pub fn as_float(&self) -> Result<f64, String> {
        match self {
            Value::Float(v) => Ok(*v),
            _ => Err(format!("Expected float64, got {}", self.kind_name())),
        }
    }

    pub fn as_bool(&self) -> Result<bool, String> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(format!("Expected bool, got {}", self.kind_name())),
        }
    }

    pub fn as_str(&self) -> Result<&str, String> {
        match self {
            Value::Str(v) => Ok(v),
            _ => Err(format!("Expected string, got {}", self.kind_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Value {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v)
    }
}

/// The concrete slot type named by a variable's type descriptor.
///
/// The binder writes through a raw pointer, so every declarable type needs a
/// known layout on both sides of the loaded-module boundary. Descriptors
/// outside this set are rejected at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Int,
    Float,
    Bool,
    Str,
}

impl VarType {
    /// Parse a type descriptor. Accepts the canonical names plus the Rust
    /// spellings callers tend to reach for.
    pub fn parse(descriptor: &str) -> Option<VarType> {
        match descriptor.trim() {
            "int" | "i64" => Some(VarType::Int),
            "float64" | "f64" | "float" => Some(VarType::Float),
            "bool" => Some(VarType::Bool),
            "string" | "str" | "text" => Some(VarType::Str),
            _ => None,
        }
    }

    /// Canonical descriptor name, as it appears in binding errors.
    pub fn name(&self) -> &'static str {
        match self {
            VarType::Int => "int",
            VarType::Float => "float64",
            VarType::Bool => "bool",
            VarType::Str => "string",
        }
    }

    /// Type spelled as it appears in the generated declarations block.
    pub fn rust_type(&self) -> &'static str {
        match self {
            VarType::Int => "i64",
            VarType::Float => "f64",
            VarType::Bool => "bool",
            VarType::Str => "Text",
        }
    }

    /// Initializer used when a variable declares no default.
    pub fn zero_literal(&self) -> &'static str {
        match self {
            VarType::Int => "0",
            VarType::Float => "0.0",
            VarType::Bool => "false",
            VarType::Str => "Text::empty()",
        }
    }

    /// Whether a dynamic value can be stored into a slot of this type.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (VarType::Int, Value::Int(_))
                | (VarType::Float, Value::Float(_))
                | (VarType::Bool, Value::Bool(_))
                | (VarType::Str, Value::Str(_))
        )
    }
}

/// A single typed variable with an optional default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: String,
    pub default: Option<Value>,
}

impl Var {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Var {
            name: name.into(),
            ty: ty.into(),
            default: None,
        }
    }

    pub fn with_default(
        name: impl Into<String>,
        ty: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Var {
            name: name.into(),
            ty: ty.into(),
            default: Some(default.into()),
        }
    }
}

/// A reusable helper emitted verbatim into the generated unit.
///
/// `source` must be a complete item (typically an `fn`); the name is only a
/// registry key, so redefining a helper replaces the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: String,
    pub source: String,
}

impl Func {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Func {
            name: name.into(),
            source: source.into(),
        }
    }
}
