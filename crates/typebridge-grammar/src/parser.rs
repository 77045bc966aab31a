//! Recursive-descent parser for nested type strings.
//!
//! Classifies a type string as a scalar or a compound (`struct`, `list`,
//! `large_list`, or whatever spellings the [`Grammar`] uses) and unpacks
//! compounds into a [`TypeNode`] tree. Recursion depth equals the nesting
//! depth of the input and is capped by [`TypeParser::with_max_depth`];
//! there is no backtracking. Bracket balance is checked once over the whole
//! input before descending.

use crate::error::{ParseError, ParseResult};
use crate::grammar::{Compound, Grammar};
use crate::node::{ListVariant, Scalar, ScalarParam, TypeNode};
use crate::splitter::{check_balanced, split_top_level, BracketSplitter};

/// Characters that may never appear in a scalar type name.
const STRUCTURAL: &[char] = &['<', '>', '(', ')', '[', ']', ',', ':'];

/// Parses a type string in the agnostic grammar.
///
/// # Errors
///
/// Returns [`ParseError`] if the input does not conform to the grammar.
///
/// # Example
///
/// ```
/// use typebridge_grammar::{parse, TypeNode};
///
/// let node = parse("struct<num:int64,arr:list<int64>>").unwrap();
/// assert!(matches!(node, TypeNode::Struct { .. }));
/// assert_eq!(node.to_string(), "struct<num:int64,arr:list<int64>>");
/// ```
pub fn parse(input: &str) -> ParseResult<TypeNode> {
    parse_with(input, &Grammar::agnostic())
}

/// Parses a type string in the given grammar.
///
/// # Errors
///
/// Returns [`ParseError`] if the input does not conform to the grammar.
pub fn parse_with(input: &str, grammar: &Grammar) -> ParseResult<TypeNode> {
    TypeParser::new(grammar).parse(input)
}

/// Parses a single scalar type string (`decimal128(38,2)`, `timestamp[ms]`).
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a well-formed scalar.
pub fn parse_scalar(input: &str) -> ParseResult<Scalar> {
    TypeParser::new(&Grammar::agnostic()).scalar(input.trim())
}

/// Default cap on compound nesting accepted by [`TypeParser`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// A parser bound to one grammar.
#[derive(Debug, Clone, Copy)]
pub struct TypeParser<'g> {
    grammar: &'g Grammar,
    delimiter: char,
    separator: char,
    max_depth: usize,
}

impl<'g> TypeParser<'g> {
    /// Creates a parser for `grammar`.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            delimiter: grammar.delimiter_char(),
            separator: grammar.separator_char(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum number of nested compounds accepted.
    ///
    /// Deeper input fails with [`ParseError::TooDeep`] instead of
    /// exhausting the stack.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parses one type expression.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the input does not conform to the grammar,
    /// or [`ParseError::TooDeep`] if it nests more compounds than allowed.
    pub fn parse(&self, input: &str) -> ParseResult<TypeNode> {
        check_balanced(input.trim())?;
        self.parse_nested(input, 0)
    }

    fn parse_nested(&self, input: &str, depth: usize) -> ParseResult<TypeNode> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        match text.find('<') {
            Some(open) => self.compound(text, open, depth),
            None => self.scalar(text).map(TypeNode::Scalar),
        }
    }

    fn compound(&self, text: &str, open: usize, depth: usize) -> ParseResult<TypeNode> {
        if depth >= self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
            });
        }
        let keyword = text[..open].trim();
        let compound = self
            .grammar
            .compound(keyword)
            .ok_or_else(|| ParseError::UnknownCompound {
                keyword: keyword.to_string(),
                grammar: self.grammar.name.clone(),
            })?;

        if !text.ends_with('>') {
            return Err(ParseError::TrailingInput {
                input: text.to_string(),
            });
        }
        let inner = &text[open + 1..text.len() - 1];

        match compound {
            Compound::Struct => self.structure(text, inner, depth + 1),
            Compound::List(variant) => self.list(text, inner, variant, depth + 1),
        }
    }

    fn structure(&self, text: &str, inner: &str, depth: usize) -> ParseResult<TypeNode> {
        let mut fields = Vec::new();
        if inner.trim().is_empty() {
            return Ok(TypeNode::Struct { fields });
        }

        for piece in BracketSplitter::new(inner, self.delimiter) {
            let piece = piece?;
            if piece.is_empty() {
                return Err(ParseError::EmptyField {
                    input: text.to_string(),
                });
            }
            let (name, value) = piece.split_once(self.separator).ok_or_else(|| {
                ParseError::MissingFieldSeparator {
                    field: piece.to_string(),
                }
            })?;
            let name = name.trim();
            // The first separator sat inside a nested type, not after a name.
            if name.contains(STRUCTURAL) {
                return Err(ParseError::MissingFieldSeparator {
                    field: piece.to_string(),
                });
            }
            if name.is_empty() {
                return Err(ParseError::EmptyFieldName {
                    field: piece.to_string(),
                });
            }
            fields.push((name.to_string(), self.parse_nested(value, depth)?));
        }
        Ok(TypeNode::Struct { fields })
    }

    fn list(
        &self,
        text: &str,
        inner: &str,
        variant: ListVariant,
        depth: usize,
    ) -> ParseResult<TypeNode> {
        let pieces = split_top_level(inner, self.delimiter)?;
        if pieces.len() != 1 || pieces[0].is_empty() {
            return Err(ParseError::ListArity {
                input: text.to_string(),
            });
        }

        let mut element = pieces[0];
        if self.grammar.list_item_label.is_some() {
            if let [label, value] = split_top_level(element, self.separator)?.as_slice() {
                if is_identifier(label) {
                    element = *value;
                }
            }
        }

        Ok(TypeNode::List {
            element: Box::new(self.parse_nested(element, depth)?),
            variant,
        })
    }

    fn scalar(&self, text: &str) -> ParseResult<Scalar> {
        let Some(open) = text.find(|c| c == '(' || c == '[') else {
            validate_name(text)?;
            return Ok(Scalar::new(text));
        };

        let name = text[..open].trim();
        validate_name(name)?;
        check_balanced(text)?;

        let close = if text[open..].starts_with('(') { ')' } else { ']' };
        if !text.ends_with(close) {
            return Err(ParseError::TrailingInput {
                input: text.to_string(),
            });
        }

        let inner = &text[open + 1..text.len() - 1];
        let params = BracketSplitter::new(inner, self.delimiter)
            .map(|piece| {
                let piece = piece?;
                if piece.is_empty() {
                    return Err(ParseError::EmptyParameter {
                        input: text.to_string(),
                    });
                }
                Ok(ScalarParam::from_raw(piece))
            })
            .collect::<ParseResult<Vec<_>>>()?;

        Ok(Scalar::new(name).with_params(params))
    }
}

fn validate_name(name: &str) -> ParseResult<()> {
    if name.is_empty() || name.contains(STRUCTURAL) || name.contains(char::is_whitespace) {
        return Err(ParseError::InvalidTypeName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int64() -> TypeNode {
        TypeNode::scalar("int64")
    }

    #[test]
    fn test_parse_plain_scalar() {
        assert_eq!(parse("int64").unwrap(), int64());
        assert_eq!(parse("  string ").unwrap(), TypeNode::scalar("string"));
    }

    #[test]
    fn test_parse_decimal_params_are_integers() {
        let node = parse("decimal128(10,2)").unwrap();
        assert_eq!(
            node,
            TypeNode::Scalar(
                Scalar::new("decimal128").with_params([ScalarParam::Int(10), ScalarParam::Int(2)])
            )
        );
    }

    #[test]
    fn test_parse_unit_params_are_strings() {
        let node = parse("timestamp(ms)").unwrap();
        let TypeNode::Scalar(s) = node else {
            panic!("expected scalar");
        };
        assert_eq!(s.name, "timestamp");
        assert_eq!(s.params, vec![ScalarParam::Str("ms".into())]);
    }

    #[test]
    fn test_parse_binary_width() {
        let TypeNode::Scalar(s) = parse("binary(128)").unwrap() else {
            panic!("expected scalar");
        };
        assert_eq!(s.int_param(0), Some(128));
    }

    #[test]
    fn test_parse_struct_preserves_field_order() {
        let node = parse("struct<b:string,a:int64>").unwrap();
        let TypeNode::Struct { fields } = node else {
            panic!("expected struct");
        };
        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_parse_nested_struct_and_list() {
        let node = parse("struct<num:int64,arr:list<int64>>").unwrap();
        assert_eq!(
            node,
            TypeNode::structure([("num", int64()), ("arr", TypeNode::list(int64()))])
        );
    }

    #[test]
    fn test_parse_struct_with_parameterized_fields() {
        let node =
            parse("struct<a:timestamp(s), b:struct<f1:int32,f2:string,f3:decimal128(3,5)>>")
                .unwrap();
        let TypeNode::Struct { fields } = &node else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 2);
        let TypeNode::Struct { fields: inner } = &fields[1].1 else {
            panic!("expected nested struct");
        };
        assert_eq!(inner.len(), 3);
        assert_eq!(inner[2].1.to_string(), "decimal128(3,5)");
    }

    #[test]
    fn test_nesting_depth() {
        for n in 0..=6 {
            let input = format!("{}int64{}", "list<".repeat(n), ">".repeat(n));
            let mut node = parse(&input).unwrap();
            assert_eq!(node.depth(), n);
            for _ in 0..n {
                let TypeNode::List { element, variant } = node else {
                    panic!("expected list at depth");
                };
                assert_eq!(variant, ListVariant::List);
                node = *element;
            }
            assert_eq!(node, int64());
        }
    }

    fn nested_lists(n: usize) -> String {
        format!("{}int64{}", "list<".repeat(n), ">".repeat(n))
    }

    #[test]
    fn test_depth_limit() {
        let g = Grammar::agnostic();
        let parser = TypeParser::new(&g).with_max_depth(8);
        assert_eq!(parser.parse(&nested_lists(8)).unwrap().depth(), 8);
        assert_eq!(
            parser.parse(&nested_lists(9)),
            Err(ParseError::TooDeep { limit: 8 })
        );
        let deep_struct = format!("{}int64{}", "struct<a:".repeat(9), ">".repeat(9));
        assert_eq!(
            parser.parse(&deep_struct),
            Err(ParseError::TooDeep { limit: 8 })
        );
    }

    #[test]
    fn test_default_depth_limit() {
        assert_eq!(
            parse(&nested_lists(DEFAULT_MAX_DEPTH)).unwrap().depth(),
            DEFAULT_MAX_DEPTH
        );
        assert_eq!(
            parse(&nested_lists(DEFAULT_MAX_DEPTH + 1)),
            Err(ParseError::TooDeep {
                limit: DEFAULT_MAX_DEPTH
            })
        );
    }

    #[test]
    fn test_very_deep_input_is_rejected() {
        for n in [1_000, 20_000, 100_000] {
            assert!(matches!(
                parse(&nested_lists(n)),
                Err(ParseError::TooDeep { .. })
            ));
        }
        let unclosed = "list<".repeat(100_000) + "int64";
        assert!(matches!(
            parse(&unclosed),
            Err(ParseError::UnclosedBracket { .. })
        ));
    }

    #[test]
    fn test_list_variants() {
        assert_eq!(parse("large_list<int64>").unwrap(), TypeNode::large_list(int64()));
        assert_eq!(parse("list_<int64>").unwrap(), TypeNode::list(int64()));
    }

    #[test]
    fn test_list_of_struct() {
        let node = parse("large_list<struct<k:string,v:list<float64>>>").unwrap();
        assert_eq!(
            node,
            TypeNode::large_list(TypeNode::structure([
                ("k", TypeNode::scalar("string")),
                ("v", TypeNode::list(TypeNode::scalar("float64"))),
            ]))
        );
    }

    #[test]
    fn test_empty_struct() {
        assert_eq!(parse("struct<>").unwrap(), TypeNode::Struct { fields: vec![] });
    }

    #[test]
    fn test_arrow_grammar_labels_and_square_params() {
        let g = Grammar::arrow();
        let node = parse_with("struct<a: timestamp[ms], b: list<item: int64>>", &g).unwrap();
        assert_eq!(
            node,
            TypeNode::structure([
                (
                    "a",
                    TypeNode::Scalar(Scalar::new("timestamp").with_params([ScalarParam::from("ms")]))
                ),
                ("b", TypeNode::list(int64())),
            ])
        );
    }

    #[test]
    fn test_hive_grammar_is_case_insensitive() {
        let node = parse_with("ARRAY<STRUCT<a:INT>>", &Grammar::hive()).unwrap();
        assert_eq!(
            node,
            TypeNode::list(TypeNode::structure([("a", TypeNode::scalar("INT"))]))
        );
        assert!(matches!(
            parse_with("large_list<int>", &Grammar::hive()),
            Err(ParseError::UnknownCompound { .. })
        ));
    }

    #[test]
    fn test_error_empty() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("struct<a:>"), Err(ParseError::Empty));
    }

    #[test]
    fn test_error_missing_separator() {
        assert!(matches!(
            parse("struct<a int64>"),
            Err(ParseError::MissingFieldSeparator { .. })
        ));
        assert!(matches!(
            parse("struct<list<int64>>"),
            Err(ParseError::MissingFieldSeparator { .. })
        ));
        assert!(matches!(
            parse("struct<struct<a:int64>>"),
            Err(ParseError::MissingFieldSeparator { .. })
        ));
    }

    #[test]
    fn test_error_empty_field_and_name() {
        assert!(matches!(
            parse("struct<a:int64,,b:string>"),
            Err(ParseError::EmptyField { .. })
        ));
        assert!(matches!(
            parse("struct<:int64>"),
            Err(ParseError::EmptyFieldName { .. })
        ));
    }

    #[test]
    fn test_error_unbalanced() {
        assert!(matches!(
            parse("struct<a:int64>>"),
            Err(ParseError::UnbalancedBracket { .. })
        ));
        assert!(matches!(
            parse("list<list<int64>"),
            Err(ParseError::UnclosedBracket { .. })
        ));
        assert!(matches!(
            parse("decimal128(38,2"),
            Err(ParseError::UnclosedBracket { .. })
        ));
        assert!(matches!(
            parse("struct<a:int64>x<y>"),
            Err(ParseError::UnbalancedBracket { .. })
        ));
    }

    #[test]
    fn test_error_trailing_input() {
        assert!(matches!(
            parse("decimal128(38,2)x"),
            Err(ParseError::TrailingInput { .. })
        ));
        assert!(matches!(
            parse("list<int64>x"),
            Err(ParseError::TrailingInput { .. })
        ));
    }

    #[test]
    fn test_error_unknown_compound() {
        let err = parse("map<string,int64>").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownCompound {
                keyword: "map".into(),
                grammar: "agnostic".into(),
            }
        );
    }

    #[test]
    fn test_error_list_arity() {
        assert!(matches!(
            parse("list<int64,string>"),
            Err(ParseError::ListArity { .. })
        ));
        assert!(matches!(parse("list<>"), Err(ParseError::ListArity { .. })));
    }

    #[test]
    fn test_error_invalid_names_and_params() {
        assert!(matches!(
            parse("int64>"),
            Err(ParseError::InvalidTypeName { .. })
        ));
        assert!(matches!(
            parse("big int"),
            Err(ParseError::InvalidTypeName { .. })
        ));
        assert!(matches!(
            parse("(38,2)"),
            Err(ParseError::InvalidTypeName { .. })
        ));
        assert!(matches!(
            parse("decimal128(38,)"),
            Err(ParseError::EmptyParameter { .. })
        ));
        assert!(matches!(
            parse("binary()"),
            Err(ParseError::EmptyParameter { .. })
        ));
    }

    #[test]
    fn test_parse_scalar_helper() {
        let s = parse_scalar("time32(ms)").unwrap();
        assert_eq!(s.str_param(0), Some("ms"));
        assert!(parse_scalar("list<int64>").is_err());
    }
}
