/// Named type aliases.
///
/// The registry is an explicit object constructed by the application and
/// handed (usually in an `Arc`) to whatever wraps functions; there is no
/// process-global table. Redefinition policy: last write wins, and the new
/// definition is immediately visible to every expression that references the
/// alias by name, including signatures built before the redefinition.
use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use crate::parse::{parse_type, ParseError};
use crate::types::TypeExpr;

/// Lookup failure for an alias name. Distinct from an ordinary type
/// mismatch: it indicates a configuration defect, not a bad argument.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("unknown type alias '{name}'")]
pub struct UnknownAlias {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct Registry {
    aliases: RwLock<HashMap<String, TypeExpr>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register or overwrite an alias. Never fails.
    pub fn define(&self, name: impl Into<String>, ty: TypeExpr) {
        self.write().insert(name.into(), ty);
    }

    /// Parse `annotation` and register it under `name`.
    pub fn typedef(&self, name: impl Into<String>, annotation: &str) -> Result<(), ParseError> {
        let ty = parse_type(annotation)?;
        self.define(name, ty);
        Ok(())
    }

    /// Look an alias up. Returns a clone of the registered expression;
    /// trees are small and built once per declaration.
    pub fn resolve(&self, name: &str) -> Result<TypeExpr, UnknownAlias> {
        self.read().get(name).cloned().ok_or_else(|| UnknownAlias {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A poisoned lock only means another thread panicked mid-insert; the map
    // itself is still a valid map, so recover the guard.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, TypeExpr>> {
        self.aliases.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, TypeExpr>> {
        self.aliases.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_resolve() {
        let reg = Registry::new();
        assert!(reg.is_empty());
        reg.define("Num", TypeExpr::Number);
        assert_eq!(reg.resolve("Num").unwrap(), TypeExpr::Number);
        assert!(reg.contains("Num"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unknown_alias() {
        let reg = Registry::new();
        assert_eq!(
            reg.resolve("Vector").unwrap_err(),
            UnknownAlias {
                name: "Vector".to_string()
            }
        );
    }

    #[test]
    fn test_last_write_wins() {
        let reg = Registry::new();
        reg.define("X", TypeExpr::Number);
        reg.define("X", TypeExpr::Str);
        assert_eq!(reg.resolve("X").unwrap(), TypeExpr::Str);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_typedef_parses() {
        let reg = Registry::new();
        reg.typedef("Vector", "{x: Number, y: Number}").unwrap();
        assert_eq!(
            reg.resolve("Vector").unwrap(),
            TypeExpr::Shape(vec![
                ("x".to_string(), TypeExpr::Number),
                ("y".to_string(), TypeExpr::Number),
            ])
        );
        assert!(reg.typedef("Bad", "[Number").is_err());
    }
}
