//! Common types shared across all statement verbs

use std::fmt;

/// JOIN types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinType {
    /// Parse a join type from user text. Only the exact SQL spellings are
    /// accepted (case-insensitive), so `LEFT` alone is rejected.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_uppercase().as_str() {
            "INNER" => Some(JoinType::Inner),
            "LEFT OUTER" => Some(JoinType::LeftOuter),
            "RIGHT OUTER" => Some(JoinType::RightOuter),
            "FULL OUTER" => Some(JoinType::FullOuter),
            "CROSS" => Some(JoinType::Cross),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::LeftOuter => "LEFT OUTER",
            JoinType::RightOuter => "RIGHT OUTER",
            JoinType::FullOuter => "FULL OUTER",
            JoinType::Cross => "CROSS",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for JoinType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Sort direction for ORDER BY clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for SortDirection {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// How rows are materialized after a statement runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Execute and commit, keep no rows
    None,
    /// Keep the first row
    One,
    /// Keep every row
    All,
    /// Keep one column projected across every row
    Column,
}

/// Kind of statement a builder is assembling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Truncate,
    Raw,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::Drop => "DROP",
            StatementKind::Truncate => "TRUNCATE",
            StatementKind::Raw => "RAW",
        }
    }
}

/// Lifecycle of the statement held by a builder.
///
/// `Empty -> Started(kind) -> Finalized(kind)`; statement-starting verbs
/// move any phase back to `Started`, `reset` moves it back to `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildPhase {
    #[default]
    Empty,
    Started(StatementKind),
    Finalized(StatementKind),
}

impl BuildPhase {
    pub fn kind(&self) -> Option<StatementKind> {
        match self {
            BuildPhase::Empty => None,
            BuildPhase::Started(kind) | BuildPhase::Finalized(kind) => Some(*kind),
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildPhase::Empty => f.write_str("empty"),
            BuildPhase::Started(kind) => write!(f, "a started {} statement", kind.as_str()),
            BuildPhase::Finalized(kind) => write!(f, "a finalized {} statement", kind.as_str()),
        }
    }
}

/// Whether text is a raw SQL expression (function call, grouping) that must
/// not be quoted
pub(crate) fn is_expression(text: &str) -> bool {
    text.contains('(') || text.contains(')')
}

/// Quote one identifier segment, doubling embedded backticks
fn quote_segment(segment: &str) -> String {
    if segment == "*" {
        return segment.to_string();
    }
    format!("`{}`", segment.replace('`', "``"))
}

/// Quote a possibly qualified identifier segment by segment:
/// `users.id` becomes `` `users`.`id` ``
pub(crate) fn quote_ident(name: &str) -> String {
    name.split('.').map(quote_segment).collect::<Vec<_>>().join(".")
}

/// Quote an identifier unless it is a raw expression
pub(crate) fn quote_expression(text: &str) -> String {
    if is_expression(text) {
        text.to_string()
    } else {
        quote_ident(text)
    }
}

/// Wrap a whole table name in identifier quotes
pub(crate) fn quote_table(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Comma-separated group of `count` placeholders: `?,?,?`
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}
