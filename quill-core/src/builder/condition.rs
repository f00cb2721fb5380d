//! Condition trees and their compilation into boolean SQL fragments

use super::common::{placeholders, quote_expression};
use crate::{LogicKeyword, Operator, Value};

/// `field operator value`. The operator stays as text until compilation so
/// that unsupported operators can be dropped there.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

/// One entry of a structured condition
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionEntry {
    Comparison(Comparison),
    Logic(LogicKeyword),
}

/// Condition given to WHERE or HAVING
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    /// Appended verbatim, binds nothing
    Raw(String),
    /// Walked left to right
    Structured(Vec<ConditionEntry>),
}

impl ConditionNode {
    pub fn is_empty(&self) -> bool {
        match self {
            ConditionNode::Raw(sql) => sql.trim().is_empty(),
            ConditionNode::Structured(entries) => entries.is_empty(),
        }
    }
}

/// Boolean fragment with the parameters its placeholders bind, in order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledCondition {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Build a comparison entry
///
/// # Examples
/// ```
/// use quill_core::{and, cmp, compile_condition, ConditionNode};
///
/// let node = ConditionNode::Structured(vec![
///     cmp("age", ">", 18),
///     and(),
///     cmp("status", "=", "active"),
/// ]);
/// let compiled = compile_condition(&node);
/// assert_eq!(compiled.sql, "(`age` > ?) AND (`status` = ?)");
/// assert_eq!(compiled.params.len(), 2);
/// ```
pub fn cmp(
    field: impl Into<String>,
    operator: impl AsRef<str>,
    value: impl Into<Value>,
) -> ConditionEntry {
    ConditionEntry::Comparison(Comparison {
        field: field.into(),
        operator: operator.as_ref().to_string(),
        value: value.into(),
    })
}

pub fn and() -> ConditionEntry {
    ConditionEntry::Logic(LogicKeyword::And)
}

pub fn or() -> ConditionEntry {
    ConditionEntry::Logic(LogicKeyword::Or)
}

pub fn not() -> ConditionEntry {
    ConditionEntry::Logic(LogicKeyword::Not)
}

/// Compile a condition. Comparisons whose operator is outside
/// [`Operator::ALL`] are skipped without emitting SQL or parameters.
pub fn compile_condition(node: &ConditionNode) -> CompiledCondition {
    let entries = match node {
        ConditionNode::Raw(sql) => {
            return CompiledCondition {
                sql: sql.clone(),
                params: Vec::new(),
            }
        }
        ConditionNode::Structured(entries) => entries,
    };

    let mut compiled = CompiledCondition::default();
    for entry in entries {
        match entry {
            ConditionEntry::Comparison(comparison) => compile_comparison(comparison, &mut compiled),
            ConditionEntry::Logic(keyword) => {
                compiled.sql.push(' ');
                compiled.sql.push_str(keyword.as_str());
                compiled.sql.push(' ');
            }
        }
    }
    compiled
}

fn compile_comparison(comparison: &Comparison, out: &mut CompiledCondition) {
    let Some(operator) = Operator::parse(&comparison.operator) else {
        tracing::warn!(
            field = %comparison.field,
            operator = %comparison.operator,
            "skipping comparison with unsupported operator"
        );
        return;
    };

    let field = quote_expression(&comparison.field);
    match &comparison.value {
        Value::Array(items) if operator.expands_list() => {
            out.sql.push_str(&format!(
                "({} {} ({}))",
                field,
                operator,
                placeholders(items.len())
            ));
            out.params.extend(items.iter().cloned());
        }
        value => {
            out.sql.push_str(&format!("({} {} ?)", field, operator));
            out.params.push(value.clone());
        }
    }
}

/// Trait for conditions that can be used in WHERE and HAVING clauses
pub trait IntoCondition {
    fn into_condition(self) -> ConditionNode;
}

impl IntoCondition for ConditionNode {
    fn into_condition(self) -> ConditionNode {
        self
    }
}

impl IntoCondition for &str {
    fn into_condition(self) -> ConditionNode {
        ConditionNode::Raw(self.to_string())
    }
}

impl IntoCondition for String {
    fn into_condition(self) -> ConditionNode {
        ConditionNode::Raw(self)
    }
}

impl IntoCondition for Vec<ConditionEntry> {
    fn into_condition(self) -> ConditionNode {
        ConditionNode::Structured(self)
    }
}

impl<const N: usize> IntoCondition for [ConditionEntry; N] {
    fn into_condition(self) -> ConditionNode {
        ConditionNode::Structured(self.into_iter().collect())
    }
}

impl IntoCondition for ConditionEntry {
    fn into_condition(self) -> ConditionNode {
        ConditionNode::Structured(vec![self])
    }
}

// Single comparison: where_(("age", ">", 18)) or where_(("age", op::GT, 18))
impl<O, T> IntoCondition for (&str, O, T)
where
    O: AsRef<str>,
    T: Into<Value>,
{
    fn into_condition(self) -> ConditionNode {
        ConditionNode::Structured(vec![cmp(self.0, self.1, self.2)])
    }
}

impl<O, T> From<(&str, O, T)> for ConditionEntry
where
    O: AsRef<str>,
    T: Into<Value>,
{
    fn from((field, operator, value): (&str, O, T)) -> Self {
        cmp(field, operator, value)
    }
}

impl From<LogicKeyword> for ConditionEntry {
    fn from(keyword: LogicKeyword) -> Self {
        ConditionEntry::Logic(keyword)
    }
}
