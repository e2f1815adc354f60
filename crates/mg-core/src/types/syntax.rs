//! Textual type syntax shared by type references and converter patterns.
//!
//! The grammar is deliberately small:
//!
//! ```text
//! type      := name ( '<' type ( ',' type )* '>' )? '?'?
//! name      := ( ALNUM | '_' | '.' | '$' )+ | '*'
//! ```
//!
//! Whitespace between tokens is ignored. The wildcard `*` is accepted by the
//! parser; callers that do not allow it (such as [`TypeRef`](super::TypeRef))
//! reject it after parsing.

use crate::error::TypeParseError;

/// A parsed, not yet validated, type expression.
///
/// # Examples
///
/// ```
/// use mg_core::TypeSyntax;
///
/// let syntax = TypeSyntax::parse("Map<String, List<*>>?").unwrap();
/// assert_eq!(syntax.name, "Map");
/// assert!(syntax.nullable);
/// assert_eq!(syntax.arguments.len(), 2);
/// assert_eq!(syntax.arguments[1].arguments[0].name, "*");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSyntax {
    /// Type name, or `*` for the wildcard.
    pub name: String,
    /// Whether a trailing `?` was present.
    pub nullable: bool,
    /// Generic arguments in declaration order.
    pub arguments: Vec<TypeSyntax>,
}

impl TypeSyntax {
    /// Parses a complete type expression.
    ///
    /// # Errors
    ///
    /// Returns [`TypeParseError`] when the input is empty, contains an
    /// unexpected character, ends early, or nests deeper than the parser
    /// supports.
    pub fn parse(input: &str) -> Result<Self, TypeParseError> {
        if input.trim().is_empty() {
            return Err(TypeParseError::Empty);
        }

        let mut parser = Parser {
            input,
            chars: input.char_indices().collect(),
            pos: 0,
        };
        let syntax = parser.parse_type(0)?;
        parser.skip_whitespace();

        match parser.peek() {
            None => Ok(syntax),
            Some((offset, found)) => Err(TypeParseError::unexpected(input, offset, found)),
        }
    }

    /// Returns `true` if this node or any nested argument is the wildcard.
    #[must_use]
    pub fn contains_wildcard(&self) -> bool {
        self.name == "*" || self.arguments.iter().any(Self::contains_wildcard)
    }
}

/// Nesting limit for generic arguments.
const MAX_NESTING: usize = 32;

struct Parser<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_type(&mut self, depth: usize) -> Result<TypeSyntax, TypeParseError> {
        if depth > MAX_NESTING {
            return Err(TypeParseError::TooDeep {
                input: self.input.to_owned(),
                limit: MAX_NESTING,
            });
        }

        self.skip_whitespace();
        let name = self.parse_name()?;

        let mut arguments = Vec::new();
        self.skip_whitespace();
        if self.peek().is_some_and(|(_, c)| c == '<') {
            self.pos += 1;
            loop {
                arguments.push(self.parse_type(depth + 1)?);
                self.skip_whitespace();
                match self.peek() {
                    Some((_, ',')) => self.pos += 1,
                    Some((_, '>')) => {
                        self.pos += 1;
                        break;
                    }
                    Some((offset, found)) => {
                        return Err(TypeParseError::unexpected(self.input, offset, found));
                    }
                    None => return Err(TypeParseError::end(self.input)),
                }
            }
        }

        self.skip_whitespace();
        let nullable = if self.peek().is_some_and(|(_, c)| c == '?') {
            self.pos += 1;
            true
        } else {
            false
        };

        Ok(TypeSyntax {
            name,
            nullable,
            arguments,
        })
    }

    fn parse_name(&mut self) -> Result<String, TypeParseError> {
        match self.peek() {
            None => return Err(TypeParseError::end(self.input)),
            Some((_, '*')) => {
                self.pos += 1;
                return Ok("*".to_owned());
            }
            Some(_) => {}
        }

        let mut name = String::new();
        while let Some((_, c)) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '.' | '$') {
                name.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }

        if name.is_empty() {
            return match self.peek() {
                Some((offset, found)) => Err(TypeParseError::unexpected(self.input, offset, found)),
                None => Err(TypeParseError::end(self.input)),
            };
        }

        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_name() {
        let syntax = TypeSyntax::parse("com.example.User").unwrap();
        assert_eq!(syntax.name, "com.example.User");
        assert!(!syntax.nullable);
        assert!(syntax.arguments.is_empty());
    }

    #[test]
    fn test_parse_nested_generics_with_whitespace() {
        let syntax = TypeSyntax::parse(" Map < String , List<Int?> > ? ").unwrap();
        assert_eq!(syntax.name, "Map");
        assert!(syntax.nullable);
        assert_eq!(syntax.arguments[0].name, "String");
        let list = &syntax.arguments[1];
        assert_eq!(list.name, "List");
        assert!(list.arguments[0].nullable);
    }

    #[test]
    fn test_parse_wildcard() {
        let syntax = TypeSyntax::parse("List<*>").unwrap();
        assert!(syntax.contains_wildcard());
        assert!(!TypeSyntax::parse("List<Int>").unwrap().contains_wildcard());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(TypeSyntax::parse("  "), Err(TypeParseError::Empty));
        assert!(matches!(
            TypeSyntax::parse("List<Int"),
            Err(TypeParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            TypeSyntax::parse("List<>"),
            Err(TypeParseError::Unexpected { found: '>', .. })
        ));
        assert!(matches!(
            TypeSyntax::parse("Int Long"),
            Err(TypeParseError::Unexpected { found: 'L', .. })
        ));
    }

    #[test]
    fn test_parse_too_deep() {
        let input = format!("{}Int{}", "List<".repeat(40), ">".repeat(40));
        assert!(matches!(
            TypeSyntax::parse(&input),
            Err(TypeParseError::TooDeep { .. })
        ));
    }
}
