//! Bracket-aware splitting of parameter and field lists.
//!
//! [`BracketSplitter`] splits on a delimiter only at nesting depth zero, so
//! `a:decimal128(38,2),b:struct<x:int64,y:string>` splits into two fields
//! rather than four. Square, round, and angle brackets are tracked by three
//! independent counters.

use std::iter::FusedIterator;

use crate::error::{ParseError, ParseResult};

/// Open-bracket counters, one per bracket family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Depth {
    square: usize,
    round: usize,
    angle: usize,
}

impl Depth {
    fn open(&mut self, c: char) {
        match c {
            '[' => self.square += 1,
            '(' => self.round += 1,
            '<' => self.angle += 1,
            _ => {}
        }
    }

    /// Closes one level of the family `c` belongs to. Returns `false` when
    /// that counter is already at zero.
    fn close(&mut self, c: char) -> bool {
        let counter = match c {
            ']' => &mut self.square,
            ')' => &mut self.round,
            '>' => &mut self.angle,
            _ => return true,
        };
        match counter.checked_sub(1) {
            Some(n) => {
                *counter = n;
                true
            }
            None => false,
        }
    }

    fn is_top_level(self) -> bool {
        self.square == 0 && self.round == 0 && self.angle == 0
    }

    /// The first bracket family left open, if any.
    fn unclosed(self) -> Option<char> {
        if self.angle > 0 {
            Some('<')
        } else if self.round > 0 {
            Some('(')
        } else if self.square > 0 {
            Some('[')
        } else {
            None
        }
    }
}

/// Lazy, single-pass splitter over the top-level pieces of a string.
///
/// Each yielded piece is trimmed. A closing bracket with no matching opener
/// yields [`ParseError::UnbalancedBracket`]; brackets still open at the end of
/// input yield [`ParseError::UnclosedBracket`]. Iteration stops after an
/// error. The delimiter must not itself be a bracket character.
#[derive(Debug, Clone)]
pub struct BracketSplitter<'a> {
    input: &'a str,
    delimiter: char,
    start: usize,
    depth: Depth,
    done: bool,
}

impl<'a> BracketSplitter<'a> {
    /// Creates a splitter over `input` that splits on `delimiter`.
    #[must_use]
    pub fn new(input: &'a str, delimiter: char) -> Self {
        Self {
            input,
            delimiter,
            start: 0,
            depth: Depth::default(),
            done: false,
        }
    }

    fn fail(&mut self, err: ParseError) -> Option<ParseResult<&'a str>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<'a> Iterator for BracketSplitter<'a> {
    type Item = ParseResult<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let rest = &self.input[self.start..];
        for (offset, c) in rest.char_indices() {
            let position = self.start + offset;
            match c {
                '[' | '(' | '<' => self.depth.open(c),
                ']' | ')' | '>' => {
                    if !self.depth.close(c) {
                        return self.fail(ParseError::UnbalancedBracket {
                            bracket: c,
                            position,
                            input: self.input.to_string(),
                        });
                    }
                }
                _ if c == self.delimiter && self.depth.is_top_level() => {
                    let piece = &self.input[self.start..position];
                    self.start = position + c.len_utf8();
                    return Some(Ok(piece.trim()));
                }
                _ => {}
            }
        }

        if let Some(bracket) = self.depth.unclosed() {
            return self.fail(ParseError::UnclosedBracket {
                bracket,
                input: self.input.to_string(),
            });
        }
        self.done = true;
        Some(Ok(self.input[self.start..].trim()))
    }
}

impl FusedIterator for BracketSplitter<'_> {}

/// Collects the top-level pieces of `input` split on `delimiter`.
///
/// # Errors
///
/// Returns the first bracket error the splitter reports.
pub fn split_top_level(input: &str, delimiter: char) -> ParseResult<Vec<&str>> {
    BracketSplitter::new(input, delimiter).collect()
}

/// Checks that every bracket in `input` is closed by one of its own family.
///
/// # Errors
///
/// Returns [`ParseError::UnbalancedBracket`] or [`ParseError::UnclosedBracket`].
pub fn check_balanced(input: &str) -> ParseResult<()> {
    BracketSplitter::new(input, ',').try_for_each(|piece| piece.map(drop))
}
