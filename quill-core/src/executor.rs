//! Statement execution and connection pool interface

use std::future::Future;

use crate::builder::common::{quote_expression, BuildPhase, FetchMode, StatementKind};
use crate::builder::normalize::IntoTable;
use crate::builder::query::{Fetched, QueryBuilder};
use crate::{Error, Result, Row, Value};

/// Result of a statement executed without fetching rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecuteOutcome {
    pub rows_affected: u64,
    /// Row id generated by the statement, if the driver reports one
    pub last_insert_id: Option<i64>,
}

/// Trait for database connection pools.
///
/// The pool is created once by the caller and borrowed by every
/// [`QueryBuilder`]; connecting, pooling and closing are the pool's own
/// business.
pub trait ConnectionPool: Send + Sync {
    /// Execute and commit a statement that returns no rows
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<ExecuteOutcome>> + Send;

    /// Execute a statement that returns multiple rows
    fn fetch_all(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Vec<Row>>> + Send;

    /// Execute a statement that returns at most one row
    fn fetch_optional(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Result<Option<Row>>> + Send;
}

/// Ensure the statement ends with exactly one `;`. A statement with no
/// body stays empty.
///
/// # Examples
/// ```
/// use quill_core::add_semicolon;
///
/// assert_eq!(add_semicolon("SELECT 1"), "SELECT 1;");
/// assert_eq!(add_semicolon("SELECT 1 ;; "), "SELECT 1;");
/// assert_eq!(add_semicolon(" ; "), "");
/// ```
pub fn add_semicolon(sql: &str) -> String {
    let body = sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if body.is_empty() {
        return String::new();
    }
    format!("{};", body)
}

/// Terminator plus the `'NULL'` -> `NULL` rewrite
pub(crate) fn finalize_sql(sql: &str) -> String {
    add_semicolon(sql).replace("'NULL'", "NULL")
}

/// Count `?` placeholders outside quoted strings and identifiers
pub(crate) fn count_placeholders(sql: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut count = 0;
    for c in sql.chars() {
        match quote {
            Some(open) if c == open => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

impl<'p, P> QueryBuilder<'p, P> {
    /// The statement as it would be sent: terminated and with `'NULL'`
    /// rewritten
    pub fn to_sql(&self) -> String {
        finalize_sql(&self.state.sql)
    }
}

impl<'p, P> QueryBuilder<'p, P>
where
    P: ConnectionPool,
{
    /// Finalize the statement and run it with `mode`; `column` selects the
    /// projected column for [`FetchMode::Column`].
    ///
    /// Does nothing while an error is recorded. Adapter failures are
    /// logged and recorded rather than returned.
    pub async fn query(&mut self, mode: FetchMode, column: usize) -> &mut Self {
        self.state.result = Fetched::Nothing;
        self.state.count = -1;
        self.state.last_insert_id = None;
        if self.state.error.is_some() {
            return self;
        }
        let kind = match self.state.phase {
            BuildPhase::Empty => {
                return self.fail(Error::invalid_sequence("query", BuildPhase::Empty.to_string()))
            }
            BuildPhase::Started(kind) | BuildPhase::Finalized(kind) => kind,
        };

        let sql = finalize_sql(&self.state.sql);
        let placeholders = count_placeholders(&sql);
        if placeholders != self.state.params.len() {
            return self.fail(Error::PlaceholderMismatch {
                placeholders,
                params: self.state.params.len(),
            });
        }

        self.state.sql = sql;
        self.state.phase = BuildPhase::Finalized(kind);

        tracing::debug!(
            sql = %self.state.sql,
            params = self.state.params.len(),
            ?mode,
            "executing statement"
        );

        match self.dispatch(mode, column).await {
            Ok((fetched, last_insert_id)) => {
                if matches!(kind, StatementKind::Insert | StatementKind::Raw) {
                    self.state.last_insert_id = last_insert_id;
                }
                self.state.count = fetched.count();
                self.state.result = fetched;
            }
            Err(error) => {
                tracing::error!(
                    error = %error,
                    sql = %self.state.sql,
                    "statement execution failed"
                );
                self.state.error = Some(error);
            }
        }
        self
    }

    /// Hand the finalized statement to the pool; the id is the one the
    /// pool reported for a non-fetching run
    async fn dispatch(&self, mode: FetchMode, column: usize) -> Result<(Fetched, Option<i64>)> {
        let sql = self.state.sql.as_str();
        let params = self.state.params.as_slice();
        match mode {
            FetchMode::None => {
                let outcome = self.pool.execute(sql, params).await?;
                Ok((Fetched::Nothing, outcome.last_insert_id))
            }
            FetchMode::One => {
                let row = self.pool.fetch_optional(sql, params).await?;
                Ok((Fetched::Row(row), None))
            }
            FetchMode::All => Ok((Fetched::Rows(self.pool.fetch_all(sql, params).await?), None)),
            FetchMode::Column => {
                let rows = self.pool.fetch_all(sql, params).await?;
                let values = rows
                    .into_iter()
                    .map(|mut row| {
                        if column < row.values.len() {
                            Ok(row.values.swap_remove(column))
                        } else {
                            Err(Error::invalid_type(
                                "column",
                                format!("row has no column at index {}", column),
                            ))
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((Fetched::Column(values), None))
            }
        }
    }

    /// Run the statement and keep every row
    pub async fn all(&mut self) -> &[Row] {
        self.query(FetchMode::All, 0).await;
        self.state.result.rows()
    }

    /// Run the statement and keep the first row
    pub async fn one(&mut self) -> Option<&Row> {
        self.query(FetchMode::One, 0).await;
        self.state.result.first()
    }

    /// Run the statement without fetching. Returns the generated row id for
    /// INSERT and raw statements when the driver reports one.
    pub async fn go(&mut self) -> Option<i64> {
        self.query(FetchMode::None, 0).await;
        self.state.last_insert_id
    }

    /// Run the statement and project column `index` of every row
    pub async fn column(&mut self, index: usize) -> &[Value] {
        self.query(FetchMode::Column, index).await;
        self.state.result.column()
    }

    /// `SELECT COUNT(<field or *>) AS counter FROM <table>`, executed at
    /// once. An empty `field` counts rows.
    pub async fn count<T>(&mut self, table: T, field: &str) -> Option<i64>
    where
        T: IntoTable,
    {
        let counted = if field.trim().is_empty() {
            "*".to_string()
        } else {
            quote_expression(field.trim())
        };
        match table.into_table().render("count") {
            Ok(table) => {
                self.start(
                    StatementKind::Select,
                    format!("SELECT COUNT({}) AS `counter` FROM {}", counted, table),
                    Vec::new(),
                );
            }
            Err(error) => {
                self.fail(error);
                return None;
            }
        }
        self.one().await.and_then(|row| row.get(0)).and_then(Value::as_i64)
    }

    /// Whether the statement returns at least one row
    pub async fn exists(&mut self) -> bool {
        self.query(FetchMode::One, 0).await;
        self.state.count > 0
    }

    pub async fn get_first(&mut self) -> Option<&Row> {
        self.one().await
    }

    /// Last row of the full result set
    pub async fn get_last(&mut self) -> Option<&Row> {
        self.all().await.last()
    }
}


/// SQLite adapter on top of sqlx
#[cfg(feature = "sqlite")]
pub mod sqlite {
    use super::*;
    use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePoolOptions, SqliteRow};
    use sqlx::{Column, Row as _, TypeInfo, ValueRef};

    /// SQLite connection pool wrapper
    #[derive(Clone)]
    pub struct SqlitePool {
        inner: sqlx::SqlitePool,
    }

    impl SqlitePool {
        /// Connect to a database URL such as `sqlite::memory:` or
        /// `sqlite://app.db`. A single connection is kept open so an
        /// in-memory database lives as long as the pool.
        pub async fn connect(database_url: &str) -> Result<Self> {
            let inner = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await?;
            Ok(Self { inner })
        }

        /// Create from an existing sqlx pool
        pub fn from_pool(pool: sqlx::SqlitePool) -> Self {
            Self { inner: pool }
        }
    }

    impl ConnectionPool for SqlitePool {
        async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteOutcome> {
            let query = bind_values_to_query(sqlx::query(sql), params);
            let result = query.execute(&self.inner).await?;
            Ok(ExecuteOutcome {
                rows_affected: result.rows_affected(),
                last_insert_id: Some(result.last_insert_rowid()),
            })
        }

        async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
            let query = bind_values_to_query(sqlx::query(sql), params);
            let rows = query.fetch_all(&self.inner).await?;
            rows.iter().map(decode_row).collect()
        }

        async fn fetch_optional(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
            let query = bind_values_to_query(sqlx::query(sql), params);
            match query.fetch_optional(&self.inner).await? {
                Some(row) => Ok(Some(decode_row(&row)?)),
                None => Ok(None),
            }
        }
    }

    /// Bind Quill values to a sqlx query, in placeholder order
    fn bind_values_to_query<'q>(
        mut query: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
        params: &'q [Value],
    ) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
        for param in params {
            query = match param {
                Value::Null => query.bind(None::<i64>),
                Value::Bool(b) => query.bind(*b),
                Value::I32(i) => query.bind(*i),
                Value::I64(i) => query.bind(*i),
                Value::F32(f) => query.bind(f64::from(*f)),
                Value::F64(f) => query.bind(*f),
                Value::String(s) => query.bind(s.as_str()),
                Value::Bytes(b) => query.bind(b.as_slice()),
                // Stored as JSON text
                Value::Json(_) | Value::Array(_) => query.bind(param.to_json().to_string()),
            };
        }
        query
    }

    /// Decode a row by the storage class of each value
    fn decode_row(row: &SqliteRow) -> Result<Row> {
        let mut columns = Vec::with_capacity(row.len());
        let mut values = Vec::with_capacity(row.len());

        for (index, column) in row.columns().iter().enumerate() {
            columns.push(column.name().to_string());

            let raw = row.try_get_raw(index)?;
            if raw.is_null() {
                values.push(Value::Null);
                continue;
            }
            let storage = raw.type_info().name().to_string();
            let value = match storage.as_str() {
                "INTEGER" | "BIGINT" | "BOOLEAN" => Value::I64(row.try_get_unchecked(index)?),
                "REAL" | "NUMERIC" => Value::F64(row.try_get_unchecked(index)?),
                "BLOB" => Value::Bytes(row.try_get_unchecked(index)?),
                _ => Value::String(row.try_get_unchecked(index)?),
            };
            values.push(value);
        }

        Ok(Row::new(columns, values))
    }

}

#[cfg(test)]
mod tests {
    use super::testing::MockPool;
    use super::*;
    use crate::{cmp, FieldItem};

    fn user(id: i64, name: &str) -> Row {
        Row::new(
            vec!["id".to_string(), "name".to_string()],
            vec![Value::I64(id), Value::from(name)],
        )
    }

    #[test]
    fn test_add_semicolon() {
        assert_eq!(add_semicolon("SELECT 1"), "SELECT 1;");
        assert_eq!(add_semicolon("SELECT 1;"), "SELECT 1;");
        assert_eq!(add_semicolon("SELECT 1 ; ;\n"), "SELECT 1;");
    }

    #[test]
    fn test_add_semicolon_keeps_empty_statement_empty() {
        assert_eq!(add_semicolon(""), "");
        assert_eq!(add_semicolon("  ; ;\n"), "");

        let pool = MockPool::new();
        let qb = QueryBuilder::new(&pool);
        assert_eq!(qb.to_sql(), "");
    }

    #[test]
    fn test_finalize_rewrites_quoted_null() {
        assert_eq!(
            finalize_sql("UPDATE t SET a = 'NULL'"),
            "UPDATE t SET a = NULL;"
        );
    }

    #[test]
    fn test_count_placeholders_ignores_quoted_text() {
        assert_eq!(count_placeholders("SELECT * FROM t WHERE a = ? AND b = '?'"), 1);
        assert_eq!(count_placeholders("SELECT `what?` FROM t WHERE c IN (?,?)"), 2);
        assert_eq!(count_placeholders("SELECT 'it''s ?' , ?"), 1);
    }

    #[tokio::test]
    async fn test_all_sends_finalized_sql() {
        let pool = MockPool::with_rows(vec![user(1, "John"), user(2, "Jane")]);
        let mut qb = QueryBuilder::new(&pool);
        let rows = qb
            .select("users", vec![FieldItem::bare("id"), FieldItem::aliased("full_name", "name")])
            .all()
            .await;
        assert_eq!(rows.len(), 2);
        assert_eq!(qb.result_count(), 2);
        assert_eq!(qb.phase(), BuildPhase::Finalized(StatementKind::Select));

        let executed = pool.executed();
        assert_eq!(
            executed[0].0,
            "SELECT `id`, `name` AS `full_name` FROM `users`;"
        );
        assert!(executed[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_params_reach_the_pool_in_order() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users")
            .where_(vec![cmp("id", "IN", vec![1, 2, 3])])
            .all()
            .await;
        let (sql, params) = pool.executed().remove(0);
        assert_eq!(sql, "SELECT * FROM `users` WHERE (`id` IN (?,?,?));");
        assert_eq!(params, vec![Value::I32(1), Value::I32(2), Value::I32(3)]);
    }

    #[tokio::test]
    async fn test_insert_go_returns_last_id() {
        let pool = MockPool::new().last_insert_id(41);
        let mut qb = QueryBuilder::new(&pool);
        let id = qb.insert("t", vec![("a", 1), ("b", 2)]).go().await;
        assert_eq!(id, Some(41));
        assert_eq!(pool.executed()[0].0, "INSERT INTO `t` (`a`, `b`) VALUES (?,?);");
        assert_eq!(qb.result_count(), -1);

        let id = qb.delete("t").go().await;
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn test_one_and_get_first() {
        let pool = MockPool::with_rows(vec![user(7, "Ada"), user(8, "Bob")]);
        let mut qb = QueryBuilder::new(&pool);
        let row = qb.select_all("users").one().await.cloned();
        assert_eq!(row, Some(user(7, "Ada")));
        assert_eq!(qb.result_count(), 1);

        let first = qb.select_all("users").get_first().await;
        assert_eq!(first.and_then(|row| row.get_named("name")), Some(&Value::from("Ada")));
    }

    #[tokio::test]
    async fn test_get_last() {
        let pool = MockPool::with_rows(vec![user(1, "a"), user(2, "b"), user(3, "c")]);
        let mut qb = QueryBuilder::new(&pool);
        let last = qb.select_all("users").get_last().await.cloned();
        assert_eq!(last, Some(user(3, "c")));
    }

    #[tokio::test]
    async fn test_column_projection() {
        let pool = MockPool::with_rows(vec![user(1, "a"), user(2, "b")]);
        let mut qb = QueryBuilder::new(&pool);
        let names = qb.select("users", ["id", "name"]).column(1).await.to_vec();
        assert_eq!(names, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(qb.result_count(), 2);

        qb.select("users", ["id", "name"]).column(5).await;
        assert!(matches!(qb.error(), Some(Error::InvalidType { verb: "column", .. })));
    }

    #[tokio::test]
    async fn test_count() {
        let pool =
            MockPool::with_rows(vec![Row::new(vec!["counter".into()], vec![Value::I64(12)])]);
        let mut qb = QueryBuilder::new(&pool);
        assert_eq!(qb.count("users", "").await, Some(12));
        assert_eq!(qb.count(("u", "users"), "u.id").await, Some(12));

        let executed = pool.executed();
        assert_eq!(executed[0].0, "SELECT COUNT(*) AS `counter` FROM `users`;");
        assert_eq!(
            executed[1].0,
            "SELECT COUNT(`u`.`id`) AS `counter` FROM `users` AS `u`;"
        );
    }

    #[tokio::test]
    async fn test_count_empty_table() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        assert_eq!(qb.count("", "").await, None);
        assert!(matches!(qb.error(), Some(Error::EmptyInput { verb: "count", .. })));
        assert!(pool.executed().is_empty());
    }

    #[tokio::test]
    async fn test_exists() {
        let empty = MockPool::new();
        let mut qb = QueryBuilder::new(&empty);
        assert!(!qb.select_all("users").where_(("id", "=", 1)).exists().await);

        let filled = MockPool::with_rows(vec![user(1, "a")]);
        let mut qb = QueryBuilder::new(&filled);
        assert!(qb.select_all("users").where_(("id", "=", 1)).exists().await);
    }

    #[tokio::test]
    async fn test_errored_chain_never_executes() {
        let pool = MockPool::with_rows(vec![user(1, "a")]);
        let mut qb = QueryBuilder::new(&pool);
        let rows = qb.select("users", "").where_(("id", "=", 1)).all().await;
        assert!(rows.is_empty());
        assert!(qb.has_error());
        assert!(pool.executed().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_on_empty_builder() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        assert_eq!(qb.go().await, None);
        assert!(matches!(qb.error(), Some(Error::InvalidSequence { verb: "query", .. })));
        assert!(pool.executed().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_mismatch_skips_execution() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.raw("SELECT * FROM users WHERE id = ? AND name = ?", vec![Value::I32(1)])
            .all()
            .await;
        assert!(matches!(
            qb.error(),
            Some(Error::PlaceholderMismatch { placeholders: 2, params: 1 })
        ));
        assert!(pool.executed().is_empty());
    }

    #[tokio::test]
    async fn test_execution_error_is_recorded() {
        let pool = MockPool::with_failure("UNIQUE constraint failed: users.email");
        let mut qb = QueryBuilder::new(&pool);
        let id = qb.insert("users", vec![("email", "a@b.c")]).go().await;
        assert_eq!(id, None);
        assert!(qb.error().is_some_and(Error::is_execution));
        assert!(qb.error_message().contains("UNIQUE constraint failed"));
        assert_eq!(pool.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_clauses_after_finalize_are_rejected() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").all().await;
        qb.where_(("id", "=", 1));
        assert!(matches!(qb.error(), Some(Error::InvalidSequence { verb: "where", .. })));
        assert_eq!(qb.sql(), "SELECT * FROM `users`;");
    }

    #[tokio::test]
    async fn test_failed_start_clears_previous_results() {
        let pool = MockPool::with_rows(vec![user(1, "a")]);
        let mut qb = QueryBuilder::new(&pool);
        assert_eq!(qb.select_all("users").all().await.len(), 1);
        assert_eq!(qb.result_count(), 1);

        qb.select("", "*");
        assert!(qb.has_error());
        assert!(!qb.exists().await);
        assert_eq!(qb.result_count(), -1);
        assert!(qb.get_first().await.is_none());
        assert!(qb.all().await.is_empty());
        assert!(qb.column(0).await.is_empty());
        assert_eq!(pool.executed().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_clause_clears_previous_results() {
        let pool = MockPool::with_rows(vec![user(1, "a")]).last_insert_id(5);
        let mut qb = QueryBuilder::new(&pool);
        assert_eq!(qb.raw("INSERT INTO t VALUES (1)", Vec::new()).go().await, Some(5));
        qb.select_all("users").all().await;

        qb.where_(("id", "=", 1));
        assert!(qb.all().await.is_empty());
        assert!(qb.one().await.is_none());
        assert!(qb.get_last().await.is_none());
        assert_eq!(qb.go().await, None);
        assert_eq!(qb.result_count(), -1);
        assert_eq!(pool.executed().len(), 2);
    }

    #[tokio::test]
    async fn test_rerun_finalized_statement() {
        let pool = MockPool::with_rows(vec![user(1, "a")]);
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").all().await;
        qb.all().await;
        let executed = pool.executed();
        assert_eq!(executed.len(), 2);
        assert_eq!(executed[1].0, "SELECT * FROM `users`;");
    }

    #[tokio::test]
    async fn test_new_statement_discards_previous_one() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").where_(("age", ">", 18));
        qb.delete("sessions");
        assert_eq!(qb.sql(), "DELETE FROM `sessions`");
        assert!(qb.params().is_empty());
        qb.go().await;
        assert_eq!(pool.executed()[0].0, "DELETE FROM `sessions`;");
    }

    #[test]
    fn test_to_sql_does_not_execute() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.update("users", ("bio", "NULL")).where_("bio = 'NULL'");
        assert_eq!(qb.to_sql(), "UPDATE `users` SET `bio` = ? WHERE bio = NULL;");
        assert!(pool.executed().is_empty());
    }

    #[test]
    fn test_blocking_terminal() {
        let pool = MockPool::with_rows(vec![user(1, "a")]);
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users");
        let count = tokio_test::block_on(async {
            qb.all().await;
            qb.result_count()
        });
        assert_eq!(count, 1);
    }
}
