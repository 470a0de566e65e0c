/// Type expression representation and the matching relation.
///
/// Annotations are authored as plain strings; `parse` converts them to this
/// structured enum, and `matches` decides whether a concrete runtime value
/// conforms. Matching is pure structural recursion: the only checked failure
/// is an alias name missing from the registry, which is a configuration
/// defect rather than a bad argument.
use crate::registry::{Registry, UnknownAlias};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Number,
    Str,
    Bool,
    /// Any callable value.
    Fn,
    /// Matches every value, `Null` included.
    Any,
    /// Ordered members; first match wins.
    Union(Vec<TypeExpr>),
    /// Heterogeneous fixed-length list: `[Number, String]`.
    Tuple(Vec<TypeExpr>),
    /// Exactly `n` elements of one type: `[Number * 10]`.
    Repeat(Box<TypeExpr>, usize),
    /// One or more elements of one type: `[...Number]`.
    Variadic(Box<TypeExpr>),
    /// Structural record match: listed fields must be present and conform,
    /// extra fields on the value are ignored.
    Shape(Vec<(String, TypeExpr)>),
    /// Named alias, resolved through the registry at match time. The name is
    /// captured, not the resolved tree, so redefining an alias is immediately
    /// visible to every expression that references it.
    Alias(String),
}

impl TypeExpr {
    /// Does `value` conform to this expression?
    ///
    /// No coercion anywhere: a boolean is never a `Number`, a numeric-looking
    /// string is never a `Number`. `Err` only on an unresolvable alias.
    pub fn matches(&self, value: &Value, aliases: &Registry) -> Result<bool, UnknownAlias> {
        match self {
            TypeExpr::Any => Ok(true),
            TypeExpr::Number => Ok(matches!(value, Value::Number(_))),
            TypeExpr::Str => Ok(matches!(value, Value::Str(_))),
            TypeExpr::Bool => Ok(matches!(value, Value::Bool(_))),
            TypeExpr::Fn => Ok(matches!(value, Value::Fn(_))),
            TypeExpr::Union(members) => {
                for m in members {
                    if m.matches(value, aliases)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            TypeExpr::Tuple(elems) => match value {
                Value::List(items) if items.len() == elems.len() => {
                    all_match_pointwise(elems, items, aliases)
                }
                _ => Ok(false),
            },
            TypeExpr::Repeat(elem, n) => match value {
                Value::List(items) if items.len() == *n => all_match(elem, items, aliases),
                _ => Ok(false),
            },
            TypeExpr::Variadic(elem) => match value {
                Value::List(items) if !items.is_empty() => all_match(elem, items, aliases),
                _ => Ok(false),
            },
            TypeExpr::Shape(fields) => match value {
                Value::Record(entries) => {
                    for (key, field_ty) in fields {
                        match entries.get(key) {
                            Some(v) if field_ty.matches(v, aliases)? => {}
                            _ => return Ok(false),
                        }
                    }
                    Ok(true)
                }
                _ => Ok(false),
            },
            TypeExpr::Alias(name) => aliases.resolve(name)?.matches(value, aliases),
        }
    }

    /// Render the expression back in annotation syntax, for error messages.
    pub fn display(&self) -> String {
        match self {
            TypeExpr::Number => "Number".to_string(),
            TypeExpr::Str => "String".to_string(),
            TypeExpr::Bool => "Boolean".to_string(),
            TypeExpr::Fn => "Function".to_string(),
            TypeExpr::Any => "Any".to_string(),
            TypeExpr::Union(members) => {
                let parts: Vec<String> = members.iter().map(|m| m.display()).collect();
                parts.join(" | ")
            }
            TypeExpr::Tuple(elems) => {
                let parts: Vec<String> = elems.iter().map(|e| e.display()).collect();
                format!("[{}]", parts.join(", "))
            }
            TypeExpr::Repeat(elem, n) => format!("[{} * {}]", elem.display(), n),
            TypeExpr::Variadic(elem) => format!("[...{}]", elem.display()),
            TypeExpr::Shape(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(k, t)| format!("{}: {}", k, t.display()))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            TypeExpr::Alias(name) => name.clone(),
        }
    }
}

fn all_match(elem: &TypeExpr, items: &[Value], aliases: &Registry) -> Result<bool, UnknownAlias> {
    for item in items {
        if !elem.matches(item, aliases)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn all_match_pointwise(
    elems: &[TypeExpr],
    items: &[Value],
    aliases: &Registry,
) -> Result<bool, UnknownAlias> {
    for (elem, item) in elems.iter().zip(items) {
        if !elem.matches(item, aliases)? {
            return Ok(false);
        }
    }
    Ok(true)
}
