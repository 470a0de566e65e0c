/// Function wrapping: signature construction and call-time checking.
///
/// Two-phase, mirroring the life of a declaration:
///   Phase 1 — `wrap` parses every parameter annotation once and builds an
///             immutable `Signature`; a parameter without an annotation is a
///             configuration error surfaced here, before any call happens.
///   Phase 2 — `TypedFn::call` checks arity, then each argument against its
///             descriptor in declaration order, runs the body only if all
///             pass, and finally checks the return value if a return
///             descriptor was declared.
///
/// Alias names are deliberately not resolved at wrap time: a signature
/// captures names, so redefining an alias changes the behavior of already
/// wrapped functions on their next call.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::TypeError;
use crate::parse::parse_type;
use crate::registry::Registry;
use crate::types::TypeExpr;
use crate::value::{repr, FnValue, NativeFn, Value};

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Parsed form of a declaration's annotations. Built once per wrapped
/// function, immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<(String, TypeExpr)>,
    pub ret: Option<TypeExpr>,
}

impl Signature {
    /// Parse the annotations of `f`. Every parameter must carry one.
    pub fn of(f: &FnValue) -> Result<Signature, TypeError> {
        let mut params = Vec::with_capacity(f.params.len());
        for (param_name, annotation) in &f.params {
            let src = annotation.as_ref().ok_or_else(|| TypeError::MissingAnnotation {
                fn_name: f.name.clone(),
                param: param_name.clone(),
            })?;
            let ty = parse_type(src).map_err(|e| TypeError::BadAnnotation {
                fn_name: f.name.clone(),
                param: param_name.clone(),
                source: e,
            })?;
            params.push((param_name.clone(), ty));
        }
        let ret = match &f.ret {
            Some(src) => Some(parse_type(src).map_err(|e| TypeError::BadReturnAnnotation {
                fn_name: f.name.clone(),
                source: e,
            })?),
            None => None,
        };
        Ok(Signature { params, ret })
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

// ---------------------------------------------------------------------------
// TypedFn
// ---------------------------------------------------------------------------

/// A wrapped function. Holds the parsed signature, the original body, and
/// the registry used to resolve aliases at call time.
#[derive(Clone)]
pub struct TypedFn {
    name: String,
    sig: Signature,
    body: NativeFn,
    registry: Arc<Registry>,
}

impl std::fmt::Debug for TypedFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedFn")
            .field("name", &self.name)
            .field("sig", &self.sig)
            .finish_non_exhaustive()
    }
}

impl TypedFn {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.sig
    }

    /// Check the call, run the body, check the result.
    ///
    /// Either every check passes and the body's result comes back, or an
    /// error propagates and no result is delivered. The body does not run
    /// unless all arguments passed.
    pub fn call(&self, args: &[Value]) -> Result<Value, TypeError> {
        if args.len() != self.sig.arity() {
            return Err(TypeError::Arity {
                fn_name: self.name.clone(),
                expected: self.sig.arity(),
                got: args.len(),
            });
        }
        for (index, ((param_name, ty), arg)) in self.sig.params.iter().zip(args).enumerate() {
            if !ty.matches(arg, &self.registry)? {
                return Err(TypeError::ArgMismatch {
                    fn_name: self.name.clone(),
                    param: param_name.clone(),
                    index,
                    expected: ty.display(),
                    got: repr(arg),
                });
            }
        }
        let result = (self.body)(args)?;
        if let Some(ret_ty) = &self.sig.ret {
            if !ret_ty.matches(&result, &self.registry)? {
                return Err(TypeError::ReturnMismatch {
                    fn_name: self.name.clone(),
                    expected: ret_ty.display(),
                    got: repr(&result),
                });
            }
        }
        Ok(result)
    }

    /// Repackage as a `Value::Fn` whose body performs the checks, so wrapped
    /// functions can live inside records. The declared annotations are kept
    /// on the value for introspection.
    pub fn into_value(self) -> Value {
        let name = self.name.clone();
        let params: Vec<(String, Option<String>)> = self
            .sig
            .params
            .iter()
            .map(|(n, ty)| (n.clone(), Some(ty.display())))
            .collect();
        let ret = self.sig.ret.as_ref().map(|ty| ty.display());
        let checked: NativeFn = Arc::new(move |args: &[Value]| self.call(args));
        Value::Fn(FnValue {
            name,
            params,
            ret,
            body: checked,
        })
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Wrap a declared function, validating its annotations now and every call
/// later. Fails if any parameter lacks an annotation or an annotation does
/// not parse.
pub fn wrap(f: FnValue, registry: &Arc<Registry>) -> Result<TypedFn, TypeError> {
    let sig = Signature::of(&f)?;
    Ok(TypedFn {
        name: f.name,
        sig,
        body: f.body,
        registry: Arc::clone(registry),
    })
}

/// Wrap every function-valued entry of `container` in place; other entries
/// pass through untouched. All declarations are validated before any entry
/// is replaced, so a failure leaves the container unchanged.
pub fn wrap_all(
    container: &mut BTreeMap<String, Value>,
    registry: &Arc<Registry>,
) -> Result<(), TypeError> {
    let mut wrapped: Vec<(String, Value)> = Vec::new();
    for (key, value) in container.iter() {
        if let Value::Fn(f) = value {
            wrapped.push((key.clone(), wrap(f.clone(), registry)?.into_value()));
        }
    }
    for (key, value) in wrapped {
        container.insert(key, value);
    }
    Ok(())
}
