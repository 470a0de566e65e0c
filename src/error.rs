/// Errors surfaced by wrapping and by calls through a wrapped function.
///
/// Three families, all synchronous and never silently recovered:
///   - configuration errors (`MissingAnnotation`, `BadAnnotation`), raised at
///     wrap time: the declaration itself is defective;
///   - resolution errors (`Resolution`), raised at call time when an alias
///     name is absent from the registry;
///   - argument errors (`Arity`, `ArgMismatch`, `ReturnMismatch`), raised at
///     call time for a bad call.
use thiserror::Error;

use crate::parse::ParseError;
use crate::registry::UnknownAlias;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("function '{fn_name}': parameter '{param}' has no type annotation")]
    MissingAnnotation { fn_name: String, param: String },

    #[error("function '{fn_name}': parameter '{param}': {source}")]
    BadAnnotation {
        fn_name: String,
        param: String,
        source: ParseError,
    },

    #[error("function '{fn_name}': return annotation: {source}")]
    BadReturnAnnotation { fn_name: String, source: ParseError },

    #[error(transparent)]
    Resolution(#[from] UnknownAlias),

    #[error("function '{fn_name}' expects {expected} argument(s), got {got}")]
    Arity {
        fn_name: String,
        expected: usize,
        got: usize,
    },

    #[error(
        "function '{fn_name}': argument '{param}' (#{index}) does not match {expected}, got {got}"
    )]
    ArgMismatch {
        fn_name: String,
        param: String,
        /// Zero-based parameter position.
        index: usize,
        expected: String,
        got: String,
    },

    #[error("function '{fn_name}': return value does not match {expected}, got {got}")]
    ReturnMismatch {
        fn_name: String,
        expected: String,
        got: String,
    },
}

impl TypeError {
    /// True for the errors that indicate a defective declaration rather
    /// than a bad call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TypeError::MissingAnnotation { .. }
                | TypeError::BadAnnotation { .. }
                | TypeError::BadReturnAnnotation { .. }
        )
    }
}
