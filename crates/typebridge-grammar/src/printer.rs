//! Serialization of type trees into a textual grammar.
//!
//! Printing is a [`convert`] walk with [`format_scalar`] as the leaf function
//! and [`TextAssembler`] joining children, so flattening a converted tree and
//! pretty-printing a parsed one share a single code path.

use std::convert::Infallible;
use std::marker::PhantomData;

use crate::convert::{convert, Assembler};
use crate::grammar::Grammar;
use crate::node::{ListVariant, Scalar, TypeNode};

/// Prints `node` in `grammar`.
///
/// `print(parse_with(s, g), g)` equals `s` once whitespace is stripped from
/// both sides, provided `s` uses the grammar's canonical keywords. Keyword
/// aliases and case variants come back in canonical spelling.
#[must_use]
pub fn print(node: &TypeNode, grammar: &Grammar) -> String {
    let mut leaf = |scalar: &Scalar| Ok::<_, Infallible>(format_scalar(scalar, grammar));
    match convert(node, &mut leaf, &mut TextAssembler::new(grammar)) {
        Ok(text) => text,
        Err(never) => match never {},
    }
}

/// Formats one scalar: `name`, `name(p1,p2)`, or `name[p]` for names the
/// grammar writes with square brackets.
#[must_use]
pub fn format_scalar(scalar: &Scalar, grammar: &Grammar) -> String {
    if scalar.params.is_empty() {
        return scalar.name.clone();
    }
    let (open, close) = if grammar.uses_square_params(&scalar.name) {
        ('[', ']')
    } else {
        ('(', ')')
    };
    let params = scalar
        .params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&grammar.delimiter);
    format!("{}{open}{params}{close}", scalar.name)
}

/// Joins already-printed children using a grammar's compound syntax.
#[derive(Debug)]
pub struct TextAssembler<'g, E = Infallible> {
    grammar: &'g Grammar,
    _error: PhantomData<fn() -> E>,
}

impl<'g, E> TextAssembler<'g, E> {
    /// Creates an assembler printing in `grammar`.
    #[must_use]
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            _error: PhantomData,
        }
    }
}

impl<E> Assembler for TextAssembler<'_, E> {
    type Output = String;
    type Error = E;

    fn list(&mut self, variant: ListVariant, element: String) -> Result<String, E> {
        let keyword = self.grammar.list_keyword_for(variant);
        Ok(match &self.grammar.list_item_label {
            Some(label) => format!("{keyword}<{label}{}{element}>", self.grammar.field_separator),
            None => format!("{keyword}<{element}>"),
        })
    }

    fn structure(&mut self, fields: Vec<(String, String)>) -> Result<String, E> {
        let body = fields
            .iter()
            .map(|(name, ty)| format!("{name}{}{ty}", self.grammar.field_separator))
            .collect::<Vec<_>>()
            .join(&self.grammar.delimiter);
        Ok(format!("{}<{body}>", self.grammar.struct_keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, parse_with};

    fn strip(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn assert_round_trip(input: &str, grammar: &Grammar) {
        let node = parse_with(input, grammar).unwrap();
        assert_eq!(strip(&print(&node, grammar)), strip(input), "grammar {}", grammar.name);
    }

    #[test]
    fn test_round_trip_agnostic() {
        let g = Grammar::agnostic();
        for input in [
            "int64",
            "decimal128(38,2)",
            "binary(128)",
            "timestamp(ns)",
            "list<int64>",
            "large_list<string>",
            "struct<num:int64,arr:list<int64>>",
            "struct<b:string,a:int64>",
            "struct<a:timestamp(s),b:struct<f1:int32,f2:string,f3:decimal128(3,5)>>",
            "list<list<list<struct<x:large_list<binary(16)>>>>>",
            "struct<>",
        ] {
            assert_round_trip(input, &g);
        }
    }

    #[test]
    fn test_round_trip_with_whitespace() {
        assert_round_trip("struct< a : int64 , b : list< string > >", &Grammar::agnostic());
    }

    #[test]
    fn test_round_trip_other_grammars() {
        assert_round_trip(
            "struct<a: timestamp[ms], b: list<item: decimal128(10, 2)>, c: large_list<item: string>>",
            &Grammar::arrow(),
        );
        assert_round_trip("struct<a:int,b:array<struct<c:decimal(10,2)>>>", &Grammar::hive());
        assert_round_trip("array<struct<x:character,y:datetime>>", &Grammar::etl_manager());
    }

    #[test]
    fn test_keyword_spellings_normalize() {
        let cases = [
            ("list_<int64>", "list<int64>", Grammar::agnostic()),
            ("struct<a:list_<list_<string>>>", "struct<a:list<list<string>>>", Grammar::agnostic()),
            ("ARRAY<STRUCT<a:INT>>", "array<struct<a:INT>>", Grammar::hive()),
            ("Struct<b:Array<string>>", "struct<b:array<string>>", Grammar::hive()),
        ];
        for (input, canonical, grammar) in cases {
            let printed = print(&parse_with(input, &grammar).unwrap(), &grammar);
            assert_eq!(printed, canonical, "grammar {}", grammar.name);
            assert_round_trip(&printed, &grammar);
        }
    }

    #[test]
    fn test_print_at_depth_limit() {
        let input = format!(
            "{}int64{}",
            "list<".repeat(crate::DEFAULT_MAX_DEPTH),
            ">".repeat(crate::DEFAULT_MAX_DEPTH)
        );
        assert_round_trip(&input, &Grammar::agnostic());
    }

    #[test]
    fn test_exact_agnostic_output() {
        let node = parse("struct< num : int64 , arr : list<int64> >").unwrap();
        assert_eq!(print(&node, &Grammar::agnostic()), "struct<num:int64,arr:list<int64>>");
    }

    #[test]
    fn test_cross_grammar_printing() {
        let node = parse("struct<a:timestamp(ms),b:large_list<decimal128(10,2)>>").unwrap();
        assert_eq!(
            print(&node, &Grammar::arrow()),
            "struct<a: timestamp[ms], b: large_list<item: decimal128(10, 2)>>"
        );
        // Hive has no large list; it collapses into array.
        assert_eq!(
            print(&node, &Grammar::hive()),
            "struct<a:timestamp(ms),b:array<decimal128(10,2)>>"
        );
    }

    #[test]
    fn test_format_scalar() {
        let s = parse("fixed_size_binary(16)").unwrap();
        let TypeNode::Scalar(s) = s else {
            panic!("expected scalar");
        };
        assert_eq!(format_scalar(&s, &Grammar::arrow()), "fixed_size_binary[16]");
        assert_eq!(format_scalar(&s, &Grammar::agnostic()), "fixed_size_binary(16)");
    }
}
