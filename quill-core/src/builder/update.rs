//! UPDATE statements

use std::collections::BTreeMap;

use super::common::{quote_ident, StatementKind};
use super::normalize::IntoTable;
use super::query::QueryBuilder;
use crate::{Error, Result, Value};

/// Trait for types that can be converted to UPDATE data
pub trait IntoUpdateData {
    fn into_update_data(self) -> Vec<(String, Value)>;
}

impl IntoUpdateData for Vec<(String, Value)> {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self
    }
}

impl IntoUpdateData for BTreeMap<String, Value> {
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter().collect()
    }
}

impl<V> IntoUpdateData for Vec<(&str, V)>
where
    V: Into<Value>,
{
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(column, value)| (column.to_string(), value.into()))
            .collect()
    }
}

impl<V, const N: usize> IntoUpdateData for [(&str, V); N]
where
    V: Into<Value>,
{
    fn into_update_data(self) -> Vec<(String, Value)> {
        self.into_iter()
            .map(|(column, value)| (column.to_string(), value.into()))
            .collect()
    }
}

/// Single column: `update("users", ("name", "Jane"))`
impl<V> IntoUpdateData for (&str, V)
where
    V: Into<Value>,
{
    fn into_update_data(self) -> Vec<(String, Value)> {
        vec![(self.0.to_string(), self.1.into())]
    }
}

impl<'p, P> QueryBuilder<'p, P> {
    /// Start `UPDATE <table> SET col = ?, ...`
    pub fn update<T, D>(&mut self, table: T, data: D) -> &mut Self
    where
        T: IntoTable,
        D: IntoUpdateData,
    {
        match render_update(table, data) {
            Ok((sql, params)) => self.start(StatementKind::Update, sql, params),
            Err(error) => self.fail(error),
        }
    }
}

fn render_update<T, D>(table: T, data: D) -> Result<(String, Vec<Value>)>
where
    T: IntoTable,
    D: IntoUpdateData,
{
    let table = table
        .into_table()
        .render("update")
        .map_err(|_| Error::empty_input("update", "table or fields"))?;
    let data = data.into_update_data();
    if data.is_empty() {
        return Err(Error::empty_input("update", "table or fields"));
    }

    let mut assignments = Vec::with_capacity(data.len());
    let mut params = Vec::with_capacity(data.len());
    for (column, value) in data {
        if column.trim().is_empty() {
            return Err(Error::empty_input("update", "field name"));
        }
        assignments.push(format!("{} = ?", quote_ident(&column)));
        params.push(value);
    }

    Ok((
        format!("UPDATE {} SET {}", table, assignments.join(", ")),
        params,
    ))
}
