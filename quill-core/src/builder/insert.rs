//! INSERT statements

use std::collections::BTreeMap;

use super::common::{placeholders, quote_ident, StatementKind};
use super::normalize::IntoTable;
use super::query::QueryBuilder;
use crate::{Error, Result, Value};

/// Data of an INSERT
#[derive(Debug, Clone, PartialEq)]
pub enum InsertData {
    /// One row of `column -> value` pairs, in column order
    Row(Vec<(String, Value)>),
    /// Several rows sharing one column list
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
}

impl InsertData {
    /// Column list and the flattened, row-major parameters
    fn layout(self) -> Result<(Vec<String>, usize, Vec<Value>)> {
        match self {
            InsertData::Row(pairs) => {
                let (columns, params): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
                let rows = usize::from(!columns.is_empty());
                Ok((columns, rows, params))
            }
            InsertData::Rows { columns, rows } => {
                if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
                    return Err(Error::invalid_type(
                        "insert",
                        format!(
                            "row has {} values but {} columns were given",
                            row.len(),
                            columns.len()
                        ),
                    ));
                }
                let count = rows.len();
                Ok((columns, count, rows.into_iter().flatten().collect()))
            }
        }
    }
}

/// Trait for types that can be converted to INSERT data
pub trait IntoInsertData {
    fn into_insert_data(self) -> InsertData;
}

impl IntoInsertData for InsertData {
    fn into_insert_data(self) -> InsertData {
        self
    }
}

impl<V> IntoInsertData for Vec<(&str, V)>
where
    V: Into<Value>,
{
    fn into_insert_data(self) -> InsertData {
        InsertData::Row(
            self.into_iter()
                .map(|(column, value)| (column.to_string(), value.into()))
                .collect(),
        )
    }
}

impl<V, const N: usize> IntoInsertData for [(&str, V); N]
where
    V: Into<Value>,
{
    fn into_insert_data(self) -> InsertData {
        InsertData::Row(
            self.into_iter()
                .map(|(column, value)| (column.to_string(), value.into()))
                .collect(),
        )
    }
}

impl IntoInsertData for Vec<(String, Value)> {
    fn into_insert_data(self) -> InsertData {
        InsertData::Row(self)
    }
}

impl IntoInsertData for BTreeMap<String, Value> {
    fn into_insert_data(self) -> InsertData {
        InsertData::Row(self.into_iter().collect())
    }
}

/// `(columns, rows)` for a multi-row insert
impl<C, V> IntoInsertData for (Vec<C>, Vec<Vec<V>>)
where
    C: Into<String>,
    V: Into<Value>,
{
    fn into_insert_data(self) -> InsertData {
        let (columns, rows) = self;
        InsertData::Rows {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

impl<'p, P> QueryBuilder<'p, P> {
    /// Start `INSERT INTO <table> (<columns>) VALUES (?,...)[,(?,...)]`
    ///
    /// # Examples
    /// ```ignore
    /// qb.insert("users", vec![("name", "Ada"), ("email", "ada@example.com")]);
    /// qb.insert("tags", (vec!["name"], vec![vec!["rust"], vec!["sql"]]));
    /// ```
    pub fn insert<T, D>(&mut self, table: T, data: D) -> &mut Self
    where
        T: IntoTable,
        D: IntoInsertData,
    {
        match render_insert(table, data) {
            Ok((sql, params)) => self.start(StatementKind::Insert, sql, params),
            Err(error) => self.fail(error),
        }
    }
}

fn render_insert<T, D>(table: T, data: D) -> Result<(String, Vec<Value>)>
where
    T: IntoTable,
    D: IntoInsertData,
{
    let table = table
        .into_table()
        .render("insert")
        .map_err(|_| Error::empty_input("insert", "table or fields"))?;
    let (columns, rows, params) = data.into_insert_data().layout()?;
    if columns.is_empty() || rows == 0 {
        return Err(Error::empty_input("insert", "table or fields"));
    }
    if columns.iter().any(|column| column.trim().is_empty()) {
        return Err(Error::empty_input("insert", "field name"));
    }

    let quoted: Vec<String> = columns.iter().map(|column| quote_ident(column)).collect();
    let group = format!("({})", placeholders(columns.len()));
    let values = vec![group; rows].join(",");
    let sql = format!("INSERT INTO {} ({}) VALUES {}", table, quoted.join(", "), values);
    Ok((sql, params))
}
