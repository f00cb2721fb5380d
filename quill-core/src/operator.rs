//! SQL comparison operators and logic keywords

use std::fmt::{self, Display};

/// Comparison operator accepted in structured conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator(&'static str);

impl Operator {
    pub const EQ: Self = Operator("=");
    pub const GT: Self = Operator(">");
    pub const LT: Self = Operator("<");
    pub const GTE: Self = Operator(">=");
    pub const LTE: Self = Operator("<=");
    pub const NEQ: Self = Operator("!=");
    pub const LIKE: Self = Operator("LIKE");
    pub const NOT_LIKE: Self = Operator("NOT LIKE");
    pub const IN: Self = Operator("IN");
    pub const NOT_IN: Self = Operator("NOT IN");

    /// Every operator a comparison may use
    pub const ALL: [Operator; 10] = [
        Self::EQ,
        Self::GT,
        Self::LT,
        Self::GTE,
        Self::LTE,
        Self::NEQ,
        Self::LIKE,
        Self::NOT_LIKE,
        Self::IN,
        Self::NOT_IN,
    ];

    /// Look up an operator from user text, ignoring case and surrounding
    /// whitespace.
    ///
    /// # Examples
    /// ```
    /// use quill_core::Operator;
    ///
    /// assert_eq!(Operator::parse("not in"), Some(Operator::NOT_IN));
    /// assert_eq!(Operator::parse("<>"), None);
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let upper = text.trim().to_uppercase();
        Self::ALL.into_iter().find(|op| op.0 == upper)
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether a sequence value expands into one placeholder per element
    pub fn expands_list(&self) -> bool {
        *self == Self::IN || *self == Self::NOT_IN
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Operator {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Keyword joining neighbouring comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicKeyword {
    And,
    Or,
    Not,
}

impl LogicKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicKeyword::And => "AND",
            LogicKeyword::Or => "OR",
            LogicKeyword::Not => "NOT",
        }
    }
}

impl Display for LogicKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const GT: Operator = Operator::GT;
    pub const LT: Operator = Operator::LT;
    pub const GTE: Operator = Operator::GTE;
    pub const LTE: Operator = Operator::LTE;
    pub const NEQ: Operator = Operator::NEQ;
    pub const LIKE: Operator = Operator::LIKE;
    pub const NOT_LIKE: Operator = Operator::NOT_LIKE;
    pub const IN: Operator = Operator::IN;
    pub const NOT_IN: Operator = Operator::NOT_IN;
}
