//! Field and table specifications and their SQL fragments

use super::common::{quote_expression, quote_table};
use crate::{Error, Result};

/// Key of an aliased item. Positional keys come from unkeyed entries and
/// never produce an `AS` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasKey {
    Name(String),
    Position(usize),
}

impl From<&str> for AliasKey {
    fn from(name: &str) -> Self {
        AliasKey::Name(name.to_string())
    }
}

impl From<String> for AliasKey {
    fn from(name: String) -> Self {
        AliasKey::Name(name)
    }
}

impl From<usize> for AliasKey {
    fn from(position: usize) -> Self {
        AliasKey::Position(position)
    }
}

/// One entry of an ordered field list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldItem {
    Bare(String),
    Aliased { alias: AliasKey, expression: String },
}

impl FieldItem {
    pub fn bare(name: impl Into<String>) -> Self {
        FieldItem::Bare(name.into())
    }

    /// `expression AS alias`
    pub fn aliased(alias: impl Into<AliasKey>, expression: impl Into<String>) -> Self {
        FieldItem::Aliased {
            alias: alias.into(),
            expression: expression.into(),
        }
    }
}

impl From<&str> for FieldItem {
    fn from(name: &str) -> Self {
        FieldItem::bare(name)
    }
}

impl From<String> for FieldItem {
    fn from(name: String) -> Self {
        FieldItem::Bare(name)
    }
}

/// `(alias, expression)`
impl From<(&str, &str)> for FieldItem {
    fn from((alias, expression): (&str, &str)) -> Self {
        FieldItem::aliased(alias, expression)
    }
}

/// Fields of a SELECT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Passed through verbatim, e.g. `*` or `id, COUNT(*) AS n`
    Plain(String),
    /// Ordered items, each quoted
    List(Vec<FieldItem>),
    /// `alias -> expression` entries in insertion order
    Map(Vec<(AliasKey, String)>),
}

impl FieldSpec {
    /// The fragments this spec expands to, one per item
    pub fn fragments(&self, verb: &'static str) -> Result<Vec<String>> {
        match self {
            FieldSpec::Plain(text) => {
                if text.trim().is_empty() {
                    return Err(Error::empty_input(verb, "fields"));
                }
                Ok(vec![text.clone()])
            }
            FieldSpec::List(items) => {
                if items.is_empty() {
                    return Err(Error::empty_input(verb, "fields"));
                }
                items
                    .iter()
                    .map(|item| match item {
                        FieldItem::Bare(name) => aliased_fragment(verb, None, name),
                        FieldItem::Aliased { alias, expression } => {
                            aliased_fragment(verb, Some(alias), expression)
                        }
                    })
                    .collect()
            }
            FieldSpec::Map(entries) => {
                if entries.is_empty() {
                    return Err(Error::empty_input(verb, "fields"));
                }
                entries
                    .iter()
                    .map(|(alias, expression)| aliased_fragment(verb, Some(alias), expression))
                    .collect()
            }
        }
    }

    /// Comma-joined fragment
    pub fn render(&self, verb: &'static str) -> Result<String> {
        Ok(self.fragments(verb)?.join(", "))
    }
}

/// Table of a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSpec {
    /// Wrapped in identifier quotes as a whole
    Name(String),
    /// `alias -> table expression` entries in insertion order
    Aliased(Vec<(AliasKey, String)>),
}

impl TableSpec {
    pub fn aliased(alias: impl Into<AliasKey>, table: impl Into<String>) -> Self {
        TableSpec::Aliased(vec![(alias.into(), table.into())])
    }

    pub fn render(&self, verb: &'static str) -> Result<String> {
        match self {
            TableSpec::Name(name) => {
                if name.trim().is_empty() {
                    return Err(Error::empty_input(verb, "table"));
                }
                Ok(quote_table(name))
            }
            TableSpec::Aliased(entries) => {
                if entries.is_empty() {
                    return Err(Error::empty_input(verb, "table"));
                }
                let fragments = entries
                    .iter()
                    .map(|(alias, table)| aliased_fragment(verb, Some(alias), table))
                    .collect::<Result<Vec<_>>>()?;
                Ok(fragments.join(", "))
            }
        }
    }
}

fn aliased_fragment(
    verb: &'static str,
    alias: Option<&AliasKey>,
    expression: &str,
) -> Result<String> {
    if expression.trim().is_empty() {
        return Err(Error::empty_input(verb, "field name"));
    }
    let quoted = quote_expression(expression);
    match alias {
        Some(AliasKey::Name(name)) if !name.is_empty() => {
            Ok(format!("{} AS {}", quoted, quote_table(name)))
        }
        _ => Ok(quoted),
    }
}

/// Trait to convert various types into a field specification
pub trait IntoFields {
    fn into_fields(self) -> FieldSpec;
}

impl IntoFields for FieldSpec {
    fn into_fields(self) -> FieldSpec {
        self
    }
}

impl IntoFields for &str {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::Plain(self.to_string())
    }
}

impl IntoFields for String {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::Plain(self)
    }
}

impl IntoFields for Vec<FieldItem> {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::List(self)
    }
}

impl IntoFields for Vec<&str> {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::List(self.into_iter().map(FieldItem::from).collect())
    }
}

impl IntoFields for Vec<String> {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::List(self.into_iter().map(FieldItem::from).collect())
    }
}

impl<const N: usize> IntoFields for [&str; N] {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::List(self.into_iter().map(FieldItem::from).collect())
    }
}

impl<const N: usize> IntoFields for [FieldItem; N] {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::List(self.into_iter().collect())
    }
}

/// `(alias, expression)` pairs
impl IntoFields for Vec<(&str, &str)> {
    fn into_fields(self) -> FieldSpec {
        FieldSpec::Map(
            self.into_iter()
                .map(|(alias, expression)| (AliasKey::from(alias), expression.to_string()))
                .collect(),
        )
    }
}

/// Trait to convert various types into a table specification
pub trait IntoTable {
    fn into_table(self) -> TableSpec;
}

impl IntoTable for TableSpec {
    fn into_table(self) -> TableSpec {
        self
    }
}

impl IntoTable for &str {
    fn into_table(self) -> TableSpec {
        TableSpec::Name(self.to_string())
    }
}

impl IntoTable for String {
    fn into_table(self) -> TableSpec {
        TableSpec::Name(self)
    }
}

impl IntoTable for &String {
    fn into_table(self) -> TableSpec {
        TableSpec::Name(self.clone())
    }
}

/// `(alias, table)`
impl IntoTable for (&str, &str) {
    fn into_table(self) -> TableSpec {
        TableSpec::aliased(self.0, self.1)
    }
}

impl IntoTable for Vec<(&str, &str)> {
    fn into_table(self) -> TableSpec {
        TableSpec::Aliased(
            self.into_iter()
                .map(|(alias, table)| (AliasKey::from(alias), table.to_string()))
                .collect(),
        )
    }
}
