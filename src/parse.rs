/// Parser for type annotation text.
///
/// Annotations are authored once per declaration and parsed strictly:
/// unknown lowercase identifiers are rejected (a likely typo), capitalized
/// identifiers outside the keyword set become aliases resolved later through
/// the registry.
///
/// Grammar:
///   type   := union
///   union  := atom ( '|' atom )*
///   atom   := keyword | alias | array | shape
///   array  := '[' '...' type ']' | '[' type '*' int ']' | '[' type (',' type)* ']'
///   shape  := '{' ( ident ':' type (',' ident ':' type)* )? '}'
use thiserror::Error;

use crate::types::TypeExpr;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("type annotation error at column {col}: {msg}")]
pub struct ParseError {
    pub col: usize,
    pub msg: String,
}

/// Parse an annotation string into a `TypeExpr`. The whole input must be
/// consumed; trailing characters are an error.
pub fn parse_type(src: &str) -> Result<TypeExpr, ParseError> {
    let mut p = Parser::new(src);
    p.skip_ws();
    if p.at_end() {
        return Err(p.error("empty type annotation"));
    }
    let ty = p.parse_union()?;
    p.skip_ws();
    if !p.at_end() {
        return Err(p.error(format!("unexpected '{}'", p.peek().unwrap())));
    }
    Ok(ty)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Parser {
            chars: src.chars().collect(),
            pos: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Grammar
    // -----------------------------------------------------------------------

    fn parse_union(&mut self) -> Result<TypeExpr, ParseError> {
        let mut members = vec![self.parse_atom()?];
        loop {
            self.skip_ws();
            if !self.eat('|') {
                break;
            }
            members.push(self.parse_atom()?);
        }
        if members.len() == 1 {
            Ok(members.pop().unwrap())
        } else {
            Ok(TypeExpr::Union(members))
        }
    }

    fn parse_atom(&mut self) -> Result<TypeExpr, ParseError> {
        self.skip_ws();
        match self.peek() {
            Some('[') => self.parse_array(),
            Some('{') => self.parse_shape(),
            Some(c) if c.is_alphabetic() || c == '_' => self.parse_ident_type(),
            Some(c) => Err(self.error(format!("unexpected '{}'", c))),
            None => Err(self.error("unexpected end of annotation")),
        }
    }

    fn parse_array(&mut self) -> Result<TypeExpr, ParseError> {
        self.expect('[')?;
        self.skip_ws();

        // [...T] — one or more elements of T
        if self.eat_str("...") {
            let elem = self.parse_union()?;
            self.skip_ws();
            self.expect(']')?;
            return Ok(TypeExpr::Variadic(Box::new(elem)));
        }

        let first = self.parse_union()?;
        self.skip_ws();

        // [T * n] — exactly n elements of T
        if self.eat('*') {
            self.skip_ws();
            let count = self.parse_count()?;
            self.skip_ws();
            self.expect(']')?;
            return Ok(TypeExpr::Repeat(Box::new(first), count));
        }

        // [T, U, ...] — fixed-length heterogeneous list
        let mut elems = vec![first];
        while self.eat(',') {
            elems.push(self.parse_union()?);
            self.skip_ws();
        }
        self.expect(']')?;
        Ok(TypeExpr::Tuple(elems))
    }

    fn parse_shape(&mut self) -> Result<TypeExpr, ParseError> {
        self.expect('{')?;
        self.skip_ws();
        let mut fields: Vec<(String, TypeExpr)> = Vec::new();
        if self.eat('}') {
            return Ok(TypeExpr::Shape(fields));
        }
        loop {
            self.skip_ws();
            let key_col = self.pos + 1;
            let key = self.parse_ident()?;
            if fields.iter().any(|(k, _)| *k == key) {
                return Err(ParseError {
                    col: key_col,
                    msg: format!("duplicate field '{}'", key),
                });
            }
            self.skip_ws();
            self.expect(':')?;
            let ty = self.parse_union()?;
            fields.push((key, ty));
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            return Ok(TypeExpr::Shape(fields));
        }
    }

    fn parse_ident_type(&mut self) -> Result<TypeExpr, ParseError> {
        let col = self.pos + 1;
        let name = self.parse_ident()?;
        match name.as_str() {
            "Any" => Ok(TypeExpr::Any),
            "Number" => Ok(TypeExpr::Number),
            "String" => Ok(TypeExpr::Str),
            "Bool" | "Boolean" => Ok(TypeExpr::Bool),
            "Function" => Ok(TypeExpr::Fn),
            _ => {
                // Capitalized identifier = alias name; lowercase = typo.
                if name.chars().next().is_some_and(|c| c.is_uppercase()) {
                    Ok(TypeExpr::Alias(name))
                } else {
                    Err(ParseError {
                        col,
                        msg: format!("unknown type '{}'", name),
                    })
                }
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let valid = if self.pos == start {
                c.is_alphabetic() || c == '_'
            } else {
                c.is_alphanumeric() || c == '_'
            };
            if !valid {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_count(&mut self) -> Result<usize, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected a repetition count"));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().map_err(|_| ParseError {
            col: start + 1,
            msg: format!("repetition count '{}' out of range", digits),
        })
    }

    // -----------------------------------------------------------------------
    // Scanner helpers
    // -----------------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let end = self.pos + s.chars().count();
        if end <= self.chars.len() && self.chars[self.pos..end].iter().collect::<String>() == s {
            self.pos = end;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.eat(c) {
            Ok(())
        } else {
            match self.peek() {
                Some(got) => Err(self.error(format!("expected '{}', found '{}'", c, got))),
                None => Err(self.error(format!("expected '{}', found end of annotation", c))),
            }
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn error(&self, msg: impl Into<String>) -> ParseError {
        ParseError {
            col: self.pos + 1,
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        assert_eq!(parse_type("Number").unwrap(), TypeExpr::Number);
        assert_eq!(parse_type("String").unwrap(), TypeExpr::Str);
        assert_eq!(parse_type("Boolean").unwrap(), TypeExpr::Bool);
        assert_eq!(parse_type("Bool").unwrap(), TypeExpr::Bool);
        assert_eq!(parse_type("Function").unwrap(), TypeExpr::Fn);
        assert_eq!(parse_type("Any").unwrap(), TypeExpr::Any);
    }

    #[test]
    fn test_union() {
        assert_eq!(
            parse_type("Number | String").unwrap(),
            TypeExpr::Union(vec![TypeExpr::Number, TypeExpr::Str])
        );
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            parse_type("[Number, String]").unwrap(),
            TypeExpr::Tuple(vec![TypeExpr::Number, TypeExpr::Str])
        );
        assert_eq!(
            parse_type("[Number * 10]").unwrap(),
            TypeExpr::Repeat(Box::new(TypeExpr::Number), 10)
        );
        assert_eq!(
            parse_type("[...Number]").unwrap(),
            TypeExpr::Variadic(Box::new(TypeExpr::Number))
        );
    }

    #[test]
    fn test_nested() {
        // [Number, [Number, [Number]]]
        let ty = parse_type("[Number, [Number, [Number]]]").unwrap();
        assert_eq!(
            ty,
            TypeExpr::Tuple(vec![
                TypeExpr::Number,
                TypeExpr::Tuple(vec![
                    TypeExpr::Number,
                    TypeExpr::Tuple(vec![TypeExpr::Number]),
                ]),
            ])
        );
    }

    #[test]
    fn test_shape() {
        assert_eq!(
            parse_type("{x: Number, y: Number}").unwrap(),
            TypeExpr::Shape(vec![
                ("x".to_string(), TypeExpr::Number),
                ("y".to_string(), TypeExpr::Number),
            ])
        );
        assert_eq!(parse_type("{}").unwrap(), TypeExpr::Shape(vec![]));
    }

    #[test]
    fn test_union_binds_inside_repeat() {
        assert_eq!(
            parse_type("[Number | String * 3]").unwrap(),
            TypeExpr::Repeat(
                Box::new(TypeExpr::Union(vec![TypeExpr::Number, TypeExpr::Str])),
                3
            )
        );
    }

    #[test]
    fn test_alias_names() {
        assert_eq!(
            parse_type("Vector").unwrap(),
            TypeExpr::Alias("Vector".to_string())
        );
        // lowercase unknowns are rejected as typos
        assert!(parse_type("number").is_err());
    }

    #[test]
    fn test_errors() {
        assert!(parse_type("").is_err());
        assert!(parse_type("   ").is_err());
        assert!(parse_type("[Number").is_err());
        assert!(parse_type("[Number *]").is_err());
        assert!(parse_type("Number extra").is_err());
        assert!(parse_type("{x: Number, x: String}").is_err());
        assert!(parse_type("[...]").is_err());
    }
}
