//! The chainable statement builder and its state

use std::slice;

use super::common::{BuildPhase, StatementKind};
use super::condition::{cmp, compile_condition, IntoCondition};
use crate::{Error, Operator, Row, Value};

/// Rows kept from the last executed statement
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Fetched {
    /// Nothing fetched yet, or the statement fetched nothing
    #[default]
    Nothing,
    Row(Option<Row>),
    Rows(Vec<Row>),
    Column(Vec<Value>),
}

impl Fetched {
    /// All kept rows; a single fetched row is a one-element slice
    pub fn rows(&self) -> &[Row] {
        match self {
            Fetched::Rows(rows) => rows,
            Fetched::Row(Some(row)) => slice::from_ref(row),
            _ => &[],
        }
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows().first()
    }

    pub fn column(&self) -> &[Value] {
        match self {
            Fetched::Column(values) => values,
            _ => &[],
        }
    }

    /// Row count, or column length for a column fetch; -1 when nothing
    /// was fetched
    pub(crate) fn count(&self) -> i64 {
        let count = match self {
            Fetched::Nothing => return -1,
            Fetched::Row(row) => usize::from(row.is_some()),
            Fetched::Rows(rows) => rows.len(),
            Fetched::Column(values) => values.len(),
        };
        i64::try_from(count).unwrap_or(i64::MAX)
    }
}

/// Mutable state owned by one builder
#[derive(Debug)]
pub struct BuilderState {
    pub(crate) sql: String,
    pub(crate) params: Vec<Value>,
    pub(crate) error: Option<Error>,
    pub(crate) result: Fetched,
    pub(crate) count: i64,
    pub(crate) last_insert_id: Option<i64>,
    pub(crate) phase: BuildPhase,
}

impl Default for BuilderState {
    fn default() -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            error: None,
            result: Fetched::Nothing,
            count: -1,
            last_insert_id: None,
            phase: BuildPhase::Empty,
        }
    }
}

/// Statement kinds WHERE / ORDER BY / LIMIT / OFFSET can extend
pub(crate) const FILTERABLE: &[StatementKind] = &[
    StatementKind::Select,
    StatementKind::Update,
    StatementKind::Delete,
    StatementKind::Raw,
];

pub(crate) const SELECT_ONLY: &[StatementKind] = &[StatementKind::Select, StatementKind::Raw];

/// Fluent builder that accumulates SQL text and its positional parameters.
///
/// Every verb returns the builder so calls chain; failures never break the
/// chain but are recorded and can be inspected with [`has_error`] and
/// [`error_message`] once the chain is done.
///
/// # Examples
/// ```ignore
/// use quill_core::{and, cmp, QueryBuilder};
///
/// let mut qb = QueryBuilder::new(&pool);
/// let adults = qb
///     .select("users", ["id", "name"])
///     .where_(vec![cmp("age", ">", 18), and(), cmp("status", "=", "active")])
///     .order_by("name DESC", "")
///     .limit(10)
///     .all()
///     .await;
/// ```
///
/// [`has_error`]: QueryBuilder::has_error
/// [`error_message`]: QueryBuilder::error_message
pub struct QueryBuilder<'p, P> {
    pub(crate) pool: &'p P,
    pub(crate) state: BuilderState,
}

impl<'p, P> QueryBuilder<'p, P> {
    /// Create a builder that executes against an already connected pool
    pub fn new(pool: &'p P) -> Self {
        Self {
            pool,
            state: BuilderState::default(),
        }
    }

    /// Return the state to that of a freshly constructed builder
    pub fn reset(&mut self) -> &mut Self {
        self.state = BuilderState::default();
        self
    }

    /// Start a statement from caller-written SQL and its parameters
    pub fn raw(&mut self, sql: impl Into<String>, params: Vec<Value>) -> &mut Self {
        let sql = sql.into();
        if sql.trim().is_empty() {
            return self.fail(Error::empty_input("raw", "sql"));
        }
        self.start(StatementKind::Raw, sql, params)
    }

    /// Append `WHERE <condition>`
    pub fn where_<C>(&mut self, condition: C) -> &mut Self
    where
        C: IntoCondition,
    {
        self.where_with(condition, "")
    }

    /// Append `WHERE <condition> <addition>`, where `addition` is raw SQL
    /// such as `COLLATE NOCASE`
    pub fn where_with<C>(&mut self, condition: C, addition: &str) -> &mut Self
    where
        C: IntoCondition,
    {
        if !self.accepts("where", FILTERABLE) {
            return self;
        }
        self.append_condition("where", "WHERE", condition, addition)
    }

    /// Append `HAVING <condition>`
    pub fn having<C>(&mut self, condition: C) -> &mut Self
    where
        C: IntoCondition,
    {
        if !self.accepts("having", SELECT_ONLY) {
            return self;
        }
        self.append_condition("having", "HAVING", condition, "")
    }

    /// `WHERE (field LIKE ?)` for a `(field, pattern)` pair; raw text is
    /// handed to [`where_`](Self::where_) unchanged
    pub fn like<L>(&mut self, condition: L) -> &mut Self
    where
        L: IntoLike,
    {
        self.like_with(condition, Operator::LIKE)
    }

    /// `WHERE (field NOT LIKE ?)`
    pub fn not_like<L>(&mut self, condition: L) -> &mut Self
    where
        L: IntoLike,
    {
        self.like_with(condition, Operator::NOT_LIKE)
    }

    fn like_with<L>(&mut self, condition: L, operator: Operator) -> &mut Self
    where
        L: IntoLike,
    {
        match condition.into_like() {
            LikeSpec::Raw(sql) => self.where_(sql),
            LikeSpec::Pattern(field, pattern) => self.where_(vec![cmp(field, operator, pattern)]),
        }
    }

    fn append_condition<C>(
        &mut self,
        verb: &'static str,
        keyword: &str,
        condition: C,
        addition: &str,
    ) -> &mut Self
    where
        C: IntoCondition,
    {
        let node = condition.into_condition();
        if node.is_empty() {
            return self.fail(Error::empty_input(verb, "condition"));
        }

        let compiled = compile_condition(&node);
        if compiled.sql.trim().is_empty() {
            return self.fail(Error::empty_input(verb, "condition"));
        }

        self.state.sql.push(' ');
        self.state.sql.push_str(keyword);
        self.state.sql.push(' ');
        self.state.sql.push_str(&compiled.sql);
        if !addition.is_empty() {
            self.state.sql.push(' ');
            self.state.sql.push_str(addition);
        }
        self.state.params.extend(compiled.params);
        self
    }

    /// Record a verb failure, keeping the chain alive
    pub(crate) fn fail(&mut self, error: Error) -> &mut Self {
        tracing::warn!(error = %error, "statement verb rejected");
        self.state.error = Some(error);
        self
    }

    /// Replace the state with a new statement of `kind`
    pub(crate) fn start(
        &mut self,
        kind: StatementKind,
        sql: String,
        params: Vec<Value>,
    ) -> &mut Self {
        self.reset();
        self.state.sql = sql;
        self.state.params = params;
        self.state.phase = BuildPhase::Started(kind);
        self
    }

    /// Whether a clause verb may extend the current statement. Records an
    /// `InvalidSequence` error when it may not; stays silent when an
    /// earlier error is already recorded.
    pub(crate) fn accepts(&mut self, verb: &'static str, kinds: &[StatementKind]) -> bool {
        if self.state.error.is_some() {
            return false;
        }
        match self.state.phase {
            BuildPhase::Started(kind) if kinds.contains(&kind) => true,
            phase => {
                self.fail(Error::invalid_sequence(verb, phase.to_string()));
                false
            }
        }
    }

    /// SQL text accumulated so far, without finalization
    pub fn sql(&self) -> &str {
        &self.state.sql
    }

    /// Parameters in placeholder order
    pub fn params(&self) -> &[Value] {
        &self.state.params
    }

    /// Result of the last executed statement
    pub fn result(&self) -> &Fetched {
        &self.state.result
    }

    /// Rows (or column values) returned by the last fetch, -1 if unknown
    pub fn result_count(&self) -> i64 {
        self.state.count
    }

    pub fn last_insert_id(&self) -> Option<i64> {
        self.state.last_insert_id
    }

    pub fn phase(&self) -> BuildPhase {
        self.state.phase
    }

    pub fn has_error(&self) -> bool {
        self.state.error.is_some()
    }

    pub fn error(&self) -> Option<&Error> {
        self.state.error.as_ref()
    }

    /// Message of the recorded error, empty when there is none
    pub fn error_message(&self) -> String {
        self.state
            .error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Argument of `like` / `not_like`
#[derive(Debug, Clone, PartialEq)]
pub enum LikeSpec {
    Raw(String),
    Pattern(String, Value),
}

pub trait IntoLike {
    fn into_like(self) -> LikeSpec;
}

impl IntoLike for LikeSpec {
    fn into_like(self) -> LikeSpec {
        self
    }
}

impl IntoLike for &str {
    fn into_like(self) -> LikeSpec {
        LikeSpec::Raw(self.to_string())
    }
}

impl IntoLike for String {
    fn into_like(self) -> LikeSpec {
        LikeSpec::Raw(self)
    }
}

/// `(field, pattern)`
impl<T> IntoLike for (&str, T)
where
    T: Into<Value>,
{
    fn into_like(self) -> LikeSpec {
        LikeSpec::Pattern(self.0.to_string(), self.1.into())
    }
}
