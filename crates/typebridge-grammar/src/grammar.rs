//! Textual type grammars.
//!
//! A [`Grammar`] names the compound keywords and punctuation of one textual
//! type syntax. The parser and printer are both driven by it, so a tree
//! parsed with one grammar can be printed with another.
//!
//! | Grammar | Struct | List | Large list |
//! |---------|--------|------|------------|
//! | agnostic | `struct<a:T>` | `list<T>` | `large_list<T>` |
//! | arrow | `struct<a: T>` | `list<item: T>` | `large_list<item: T>` |
//! | hive | `struct<a:T>` | `array<T>` | collapses to `array<T>` |
//! | etl_manager | `struct<a:T>` | `array<T>` | collapses to `array<T>` |

use serde::{Deserialize, Serialize};

use crate::node::ListVariant;

/// Keyword spellings and punctuation of one textual type grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name used in error messages.
    pub name: String,
    /// Keyword introducing a struct (`struct`).
    pub struct_keyword: String,
    /// Keyword introducing a 32-bit-offset list (`list`, `array`).
    pub list_keyword: String,
    /// Keyword for 64-bit-offset lists; `None` collapses them into
    /// [`Grammar::list_keyword`] when printing.
    #[serde(default)]
    pub large_list_keyword: Option<String>,
    /// Additional spellings accepted as list keywords when parsing.
    #[serde(default)]
    pub list_aliases: Vec<String>,
    /// Text between a struct field name and its type.
    pub field_separator: String,
    /// Text between struct fields and between scalar parameters.
    pub delimiter: String,
    /// Label printed before a list element (`item` in `list<item: T>`).
    #[serde(default)]
    pub list_item_label: Option<String>,
    /// Scalar names whose parameters are written in square brackets.
    #[serde(default)]
    pub square_params: Vec<String>,
    /// Whether compound keywords match case-insensitively.
    #[serde(default)]
    pub case_insensitive_keywords: bool,
}

/// A compound keyword recognised before `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compound {
    /// `struct<...>`
    Struct,
    /// `list<...>` or `large_list<...>`
    List(ListVariant),
}

impl Grammar {
    /// The platform-independent interchange grammar.
    #[must_use]
    pub fn agnostic() -> Self {
        Self {
            name: "agnostic".into(),
            struct_keyword: "struct".into(),
            list_keyword: "list".into(),
            large_list_keyword: Some("large_list".into()),
            list_aliases: vec!["list_".into()],
            field_separator: ":".into(),
            delimiter: ",".into(),
            list_item_label: None,
            square_params: Vec::new(),
            case_insensitive_keywords: false,
        }
    }

    /// The columnar in-memory format's textual rendering
    /// (`struct<a: int64, b: list<item: string>>`, `timestamp[ms]`).
    #[must_use]
    pub fn arrow() -> Self {
        Self {
            name: "arrow".into(),
            struct_keyword: "struct".into(),
            list_keyword: "list".into(),
            large_list_keyword: Some("large_list".into()),
            list_aliases: Vec::new(),
            field_separator: ": ".into(),
            delimiter: ", ".into(),
            list_item_label: Some("item".into()),
            square_params: [
                "timestamp",
                "time32",
                "time64",
                "date32",
                "date64",
                "duration",
                "fixed_size_binary",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            case_insensitive_keywords: false,
        }
    }

    /// The catalog / Hive-style DDL grammar (`struct<a:int>`, `array<string>`).
    #[must_use]
    pub fn hive() -> Self {
        Self {
            name: "hive".into(),
            struct_keyword: "struct".into(),
            list_keyword: "array".into(),
            large_list_keyword: None,
            list_aliases: Vec::new(),
            field_separator: ":".into(),
            delimiter: ",".into(),
            list_item_label: None,
            square_params: Vec::new(),
            case_insensitive_keywords: true,
        }
    }

    /// The ETL-manager table metadata grammar.
    #[must_use]
    pub fn etl_manager() -> Self {
        Self {
            name: "etl_manager".into(),
            list_aliases: Vec::new(),
            case_insensitive_keywords: false,
            ..Self::hive()
        }
    }

    /// All compound keywords this grammar recognises.
    #[must_use]
    pub fn compound_names(&self) -> Vec<&str> {
        let mut names = vec![self.struct_keyword.as_str(), self.list_keyword.as_str()];
        names.extend(self.large_list_keyword.as_deref());
        names.extend(self.list_aliases.iter().map(String::as_str));
        names
    }

    /// Classifies a keyword found before `<`.
    #[must_use]
    pub fn compound(&self, keyword: &str) -> Option<Compound> {
        let keyword = keyword.trim();
        if self.keyword_eq(keyword, &self.struct_keyword) {
            return Some(Compound::Struct);
        }
        if let Some(large) = &self.large_list_keyword {
            if self.keyword_eq(keyword, large) {
                return Some(Compound::List(ListVariant::LargeList));
            }
        }
        let is_list = self.keyword_eq(keyword, &self.list_keyword)
            || self.list_aliases.iter().any(|a| self.keyword_eq(keyword, a));
        is_list.then_some(Compound::List(ListVariant::List))
    }

    /// The keyword printed for a list variant.
    #[must_use]
    pub fn list_keyword_for(&self, variant: ListVariant) -> &str {
        match (variant, &self.large_list_keyword) {
            (ListVariant::LargeList, Some(large)) => large,
            _ => &self.list_keyword,
        }
    }

    /// Whether the grammar distinguishes large lists from lists.
    #[must_use]
    pub fn has_large_list(&self) -> bool {
        self.large_list_keyword.is_some()
    }

    /// Whether parameters of `scalar_name` are written in square brackets.
    #[must_use]
    pub fn uses_square_params(&self, scalar_name: &str) -> bool {
        self.square_params.iter().any(|n| n == scalar_name)
    }

    /// The character struct fields and scalar parameters are split on.
    #[must_use]
    pub fn delimiter_char(&self) -> char {
        first_symbol(&self.delimiter, ',')
    }

    /// The character between a struct field name and its type.
    #[must_use]
    pub fn separator_char(&self) -> char {
        first_symbol(&self.field_separator, ':')
    }

    fn keyword_eq(&self, found: &str, keyword: &str) -> bool {
        if self.case_insensitive_keywords {
            found.eq_ignore_ascii_case(keyword)
        } else {
            found == keyword
        }
    }
}

fn first_symbol(text: &str, fallback: char) -> char {
    text.chars().find(|c| !c.is_whitespace()).unwrap_or(fallback)
}

impl Default for Grammar {
    fn default() -> Self {
        Self::agnostic()
    }
}
