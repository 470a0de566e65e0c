/// Core runtime value type and associated utilities.
///
/// Lives in its own module so the matcher (`types`) and the wrapper layer
/// (`wrap`) can both import it without circular dependencies.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::TypeError;

/// Body of a callable value. Takes the positional arguments and either
/// produces a result or propagates a type error (wrapped bodies re-check
/// their own arguments, so failure must be expressible).
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, TypeError> + Send + Sync>;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
    /// Keyed record. Ordered map so display and iteration are deterministic.
    Record(BTreeMap<String, Value>),
    Fn(FnValue),
    /// The dedicated non-object value. Matches only `Any`.
    Null,
}

impl Value {
    /// Name of the value's runtime class, as used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Str(_) => "String",
            Value::Bool(_) => "Boolean",
            Value::List(_) => "List",
            Value::Record(_) => "Record",
            Value::Fn(_) => "Function",
            Value::Null => "Null",
        }
    }

    pub fn list(elems: impl IntoIterator<Item = Value>) -> Value {
        Value::List(elems.into_iter().collect())
    }

    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(elems: Vec<Value>) -> Self {
        Value::List(elems)
    }
}

// ---------------------------------------------------------------------------
// FnValue
// ---------------------------------------------------------------------------

/// A callable value: the declared parameter list (name plus optional
/// annotation text), an optional return annotation, and a native body.
/// Annotations stay as source text here; `wrap` parses them into a
/// `Signature` once per declaration.
#[derive(Clone)]
pub struct FnValue {
    pub name: String,
    /// (parameter name, annotation text). `None` means the author declared
    /// the parameter without a type; `wrap` rejects that.
    pub params: Vec<(String, Option<String>)>,
    pub ret: Option<String>,
    pub body: NativeFn,
}

impl FnValue {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, TypeError> + Send + Sync + 'static,
    {
        FnValue {
            name: name.into(),
            params: Vec::new(),
            ret: None,
            body: Arc::new(body),
        }
    }

    /// Append an annotated parameter.
    pub fn param(mut self, name: impl Into<String>, annotation: impl Into<String>) -> Self {
        self.params.push((name.into(), Some(annotation.into())));
        self
    }

    /// Append a parameter without a type annotation. Wrapping a function
    /// containing one fails with a configuration error.
    pub fn param_untyped(mut self, name: impl Into<String>) -> Self {
        self.params.push((name.into(), None));
        self
    }

    /// Attach a return-value annotation.
    pub fn returns(mut self, annotation: impl Into<String>) -> Self {
        self.ret = Some(annotation.into());
        self
    }

    /// Invoke the body directly, without any checks of its own. For a value
    /// produced by `wrap`/`wrap_all` the body already performs them.
    pub fn call(&self, args: &[Value]) -> Result<Value, TypeError> {
        (self.body)(args)
    }
}

impl fmt::Debug for FnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnValue")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .finish_non_exhaustive()
    }
}

/// Bodies are opaque; two function values are equal only if they share one.
impl PartialEq for FnValue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.body, &other.body)
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Human-readable representation of a value (used in error messages).
pub fn repr(val: &Value) -> String {
    match val {
        Value::Number(n) => {
            if n.fract() == 0.0 && n.is_finite() {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }
        }
        Value::Str(s) => format!("{:?}", s),
        Value::Bool(b) => b.to_string(),
        Value::List(elems) => {
            let parts: Vec<String> = elems.iter().map(repr).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Record(fields) => {
            let parts: Vec<String> = fields
                .iter()
                .map(|(k, v)| format!("{}: {}", k, repr(v)))
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::Fn(f) => format!("<fn {}>", f.name),
        Value::Null => "null".to_string(),
    }
}
