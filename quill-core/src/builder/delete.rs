//! DELETE, DROP TABLE and TRUNCATE TABLE statements

use super::common::{quote_table, StatementKind};
use super::normalize::IntoTable;
use super::query::QueryBuilder;
use crate::Error;

impl<'p, P> QueryBuilder<'p, P> {
    /// Start `DELETE FROM <table>`
    pub fn delete<T>(&mut self, table: T) -> &mut Self
    where
        T: IntoTable,
    {
        match table.into_table().render("delete") {
            Ok(table) => self.start(
                StatementKind::Delete,
                format!("DELETE FROM {}", table),
                Vec::new(),
            ),
            Err(error) => self.fail(error),
        }
    }

    /// Start `DROP TABLE [IF EXISTS] <table>`
    pub fn drop(&mut self, table: &str, add_exists: bool) -> &mut Self {
        if table.trim().is_empty() {
            return self.fail(Error::empty_input("drop", "table"));
        }
        let exists = if add_exists { "IF EXISTS " } else { "" };
        self.start(
            StatementKind::Drop,
            format!("DROP TABLE {}{}", exists, quote_table(table.trim())),
            Vec::new(),
        )
    }

    /// Start `TRUNCATE TABLE <table>`
    pub fn truncate(&mut self, table: &str) -> &mut Self {
        if table.trim().is_empty() {
            return self.fail(Error::empty_input("truncate", "table"));
        }
        self.start(
            StatementKind::Truncate,
            format!("TRUNCATE TABLE {}", quote_table(table.trim())),
            Vec::new(),
        )
    }
}
