//! SELECT statements and the clauses that extend them

use super::common::{quote_expression, quote_ident, JoinType, SortDirection, StatementKind};
use super::normalize::{IntoFields, IntoTable};
use super::query::{QueryBuilder, FILTERABLE, SELECT_ONLY};
use crate::Error;

/// ON clause of a JOIN
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOn {
    /// No ON clause, e.g. for CROSS JOIN
    None,
    /// `left = right`, both quoted as identifiers
    Columns(String, String),
    /// Appended verbatim after `ON`
    Raw(String),
}

pub trait IntoJoinOn {
    fn into_join_on(self) -> JoinOn;
}

impl IntoJoinOn for JoinOn {
    fn into_join_on(self) -> JoinOn {
        self
    }
}

impl IntoJoinOn for () {
    fn into_join_on(self) -> JoinOn {
        JoinOn::None
    }
}

impl IntoJoinOn for &str {
    fn into_join_on(self) -> JoinOn {
        if self.trim().is_empty() {
            JoinOn::None
        } else {
            JoinOn::Raw(self.to_string())
        }
    }
}

impl IntoJoinOn for String {
    fn into_join_on(self) -> JoinOn {
        self.as_str().into_join_on()
    }
}

impl IntoJoinOn for (&str, &str) {
    fn into_join_on(self) -> JoinOn {
        JoinOn::Columns(self.0.to_string(), self.1.to_string())
    }
}

/// Trait to convert `"name [ASC|DESC]"` strings or lists of them into
/// ORDER BY items
pub trait IntoSortFields {
    fn into_sort_fields(self) -> Vec<String>;
}

impl IntoSortFields for &str {
    fn into_sort_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoSortFields for String {
    fn into_sort_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoSortFields for Vec<&str> {
    fn into_sort_fields(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoSortFields for Vec<String> {
    fn into_sort_fields(self) -> Vec<String> {
        self
    }
}

impl<const N: usize> IntoSortFields for [&str; N] {
    fn into_sort_fields(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

/// `name DESC` -> `` `name` DESC ``. A direction token overrides
/// `default_sort`; the first two whitespace-separated tokens are used.
fn sort_fragment(item: &str, default_sort: &str) -> String {
    let mut tokens = item.split_whitespace();
    let field = tokens.next().unwrap_or_default();
    let sort = tokens.next().unwrap_or(default_sort);
    let direction = match SortDirection::parse(sort) {
        Some(direction) => direction.as_str().to_string(),
        None if sort.trim().is_empty() => SortDirection::Asc.as_str().to_string(),
        None => sort.trim().to_uppercase(),
    };
    format!("{} {}", quote_ident(field), direction)
}

impl<'p, P> QueryBuilder<'p, P> {
    /// Start `SELECT <fields> FROM <table>`
    ///
    /// Plain strings are used verbatim as the field list; lists and
    /// `(alias, expression)` pairs are quoted item by item.
    pub fn select<T, F>(&mut self, table: T, fields: F) -> &mut Self
    where
        T: IntoTable,
        F: IntoFields,
    {
        let table = table.into_table();
        let fields = fields.into_fields();
        let rendered = table.render("select").and_then(|table| {
            if table.is_empty() {
                return Err(Error::empty_input("select", "table"));
            }
            fields.render("select").map(|fields| (table, fields))
        });

        match rendered {
            Ok((table, fields)) => self.start(
                StatementKind::Select,
                format!("SELECT {} FROM {}", fields, table),
                Vec::new(),
            ),
            Err(error) => self.fail(error),
        }
    }

    /// Start `SELECT * FROM <table>`
    pub fn select_all<T>(&mut self, table: T) -> &mut Self
    where
        T: IntoTable,
    {
        self.select(table, "*")
    }

    /// Append `<TYPE> JOIN <table> [ON ...]`. `join_type` must be one of
    /// `INNER`, `LEFT OUTER`, `RIGHT OUTER`, `FULL OUTER` or `CROSS`.
    pub fn join<T, O>(&mut self, table: T, on: O, join_type: impl AsRef<str>) -> &mut Self
    where
        T: IntoTable,
        O: IntoJoinOn,
    {
        if !self.accepts("join", SELECT_ONLY) {
            return self;
        }
        let Some(join_type) = JoinType::parse(join_type.as_ref()) else {
            return self.fail(Error::invalid_join_type(join_type.as_ref()));
        };
        let table = match table.into_table().render("join") {
            Ok(table) => table,
            Err(error) => return self.fail(error),
        };

        let on = match on.into_join_on() {
            JoinOn::None => String::new(),
            JoinOn::Columns(left, right) => {
                if left.trim().is_empty() || right.trim().is_empty() {
                    return self.fail(Error::empty_input("join", "on-clause"));
                }
                format!(" ON {} = {}", quote_expression(&left), quote_expression(&right))
            }
            JoinOn::Raw(sql) => format!(" ON {}", sql),
        };

        self.state
            .sql
            .push_str(&format!(" {} JOIN {}{}", join_type, table, on));
        self
    }

    /// Add an INNER JOIN clause
    pub fn inner_join<T, O>(&mut self, table: T, on: O) -> &mut Self
    where
        T: IntoTable,
        O: IntoJoinOn,
    {
        self.join(table, on, JoinType::Inner)
    }

    /// Add a LEFT OUTER JOIN clause
    pub fn left_join<T, O>(&mut self, table: T, on: O) -> &mut Self
    where
        T: IntoTable,
        O: IntoJoinOn,
    {
        self.join(table, on, JoinType::LeftOuter)
    }

    /// Append `ORDER BY`. Each item may carry its own direction
    /// (`"created_at DESC"`); `sort` applies to items that do not, and an
    /// empty `sort` means `ASC`. Unrecognised direction tokens are passed
    /// through upper-cased.
    pub fn order_by<F>(&mut self, fields: F, sort: impl AsRef<str>) -> &mut Self
    where
        F: IntoSortFields,
    {
        if !self.accepts("order_by", FILTERABLE) {
            return self;
        }
        let items = fields.into_sort_fields();
        if items.is_empty() || items.iter().any(|item| item.trim().is_empty()) {
            return self.fail(Error::empty_input("order_by", "field"));
        }

        let fragments: Vec<String> = items
            .iter()
            .map(|item| sort_fragment(item, sort.as_ref()))
            .collect();
        self.state.sql.push_str(" ORDER BY ");
        self.state.sql.push_str(&fragments.join(", "));
        self
    }

    /// Append `GROUP BY <field>`
    pub fn group_by(&mut self, field: &str) -> &mut Self {
        if !self.accepts("group_by", SELECT_ONLY) {
            return self;
        }
        if field.trim().is_empty() {
            return self.fail(Error::empty_input("group_by", "field"));
        }
        self.state.sql.push_str(" GROUP BY ");
        self.state.sql.push_str(&quote_ident(field.trim()));
        self
    }

    /// Append `LIMIT <n>`
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        if self.accepts("limit", FILTERABLE) {
            self.state.sql.push_str(&format!(" LIMIT {}", limit));
        }
        self
    }

    /// Append `OFFSET <n>`
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        if self.accepts("offset", FILTERABLE) {
            self.state.sql.push_str(&format!(" OFFSET {}", offset));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::normalize::{FieldItem, TableSpec};
    use crate::executor::testing::MockPool;
    use crate::{cmp, BuildPhase, Error, QueryBuilder, SortDirection, StatementKind, Value};

    #[test]
    fn test_select_list_with_alias() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select(
            "users",
            vec![FieldItem::bare("id"), FieldItem::aliased("full_name", "name")],
        );
        assert_eq!(qb.sql(), "SELECT `id`, `name` AS `full_name` FROM `users`");
        assert!(qb.params().is_empty());
        assert_eq!(qb.phase(), BuildPhase::Started(StatementKind::Select));
    }

    #[test]
    fn test_select_all_and_plain_fields() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users");
        assert_eq!(qb.sql(), "SELECT * FROM `users`");

        qb.select("users", "id, name");
        assert_eq!(qb.sql(), "SELECT id, name FROM `users`");
    }

    #[test]
    fn test_select_aliased_table() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select(("u", "users"), ["u.id", "u.email"]);
        assert_eq!(qb.sql(), "SELECT `u`.`id`, `u`.`email` FROM `users` AS `u`");
    }

    #[test]
    fn test_select_empty_fields_keeps_previous_state() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select("users", Vec::<&str>::new());
        assert!(qb.has_error());
        assert_eq!(qb.sql(), "");
        assert_eq!(qb.phase(), BuildPhase::Empty);
        assert!(!qb.error_message().is_empty());
    }

    #[test]
    fn test_select_empty_table() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select(TableSpec::Aliased(Vec::new()), "*");
        assert!(matches!(qb.error(), Some(Error::EmptyInput { what: "table", .. })));
    }

    #[test]
    fn test_valid_select_clears_previous_error() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select("", "*");
        assert!(qb.has_error());
        qb.select("users", "*");
        assert!(!qb.has_error());
    }

    #[test]
    fn test_join_on_columns() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select(("u", "users"), ["u.name", "p.title"])
            .join(("p", "posts"), ("u.id", "p.author_id"), "left outer");
        assert_eq!(
            qb.sql(),
            "SELECT `u`.`name`, `p`.`title` FROM `users` AS `u` \
             LEFT OUTER JOIN `posts` AS `p` ON `u`.`id` = `p`.`author_id`"
        );
    }

    #[test]
    fn test_join_raw_on_and_cross() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("a")
            .inner_join("b", "a.id = b.a_id AND b.active = 1")
            .join("c", (), "CROSS");
        assert_eq!(
            qb.sql(),
            "SELECT * FROM `a` INNER JOIN `b` ON a.id = b.a_id AND b.active = 1 CROSS JOIN `c`"
        );
    }

    #[test]
    fn test_join_invalid_type() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("a").join("b", ("a.id", "b.id"), "SIDEWAYS");
        assert!(matches!(qb.error(), Some(Error::InvalidJoinType { .. })));
        assert_eq!(qb.sql(), "SELECT * FROM `a`");
    }

    #[test]
    fn test_join_empty_table() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("a").left_join("", ("a.id", "b.id"));
        assert!(matches!(qb.error(), Some(Error::EmptyInput { verb: "join", .. })));
    }

    #[test]
    fn test_order_by_single_with_embedded_direction() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").order_by("created_at desc", "");
        assert_eq!(qb.sql(), "SELECT * FROM `users` ORDER BY `created_at` DESC");
    }

    #[test]
    fn test_order_by_defaults_to_asc() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").order_by("u.name", "");
        assert_eq!(qb.sql(), "SELECT * FROM `users` ORDER BY `u`.`name` ASC");
    }

    #[test]
    fn test_order_by_explicit_sort_argument() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").order_by("name", SortDirection::Desc);
        assert_eq!(qb.sql(), "SELECT * FROM `users` ORDER BY `name` DESC");
    }

    #[test]
    fn test_order_by_list() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").order_by(["name", "age DESC"], "");
        assert_eq!(qb.sql(), "SELECT * FROM `users` ORDER BY `name` ASC, `age` DESC");
    }

    #[test]
    fn test_order_by_unknown_direction_passes_through() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").order_by("name nulls", "");
        assert_eq!(qb.sql(), "SELECT * FROM `users` ORDER BY `name` NULLS");
        assert!(!qb.has_error());
    }

    #[test]
    fn test_order_by_empty() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users").order_by(Vec::<&str>::new(), "");
        assert!(matches!(qb.error(), Some(Error::EmptyInput { verb: "order_by", .. })));
    }

    #[test]
    fn test_group_by() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select("orders", "customer_id, COUNT(*)").group_by("orders.customer_id");
        assert_eq!(
            qb.sql(),
            "SELECT customer_id, COUNT(*) FROM `orders` GROUP BY `orders`.`customer_id`"
        );

        qb.group_by("");
        assert!(qb.has_error());
    }

    #[test]
    fn test_limit_and_offset_are_literals() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select_all("users")
            .where_(("active", "=", true))
            .limit(10)
            .offset(20);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM `users` WHERE (`active` = ?) LIMIT 10 OFFSET 20"
        );
        assert_eq!(qb.params(), &[Value::Bool(true)]);
    }

    #[test]
    fn test_join_after_delete_is_rejected() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.delete("users").join("b", ("a", "b"), "INNER");
        assert!(matches!(qb.error(), Some(Error::InvalidSequence { verb: "join", .. })));
        assert_eq!(qb.sql(), "DELETE FROM `users`");
    }

    #[test]
    fn test_full_chain_params_in_order() {
        let pool = MockPool::new();
        let mut qb = QueryBuilder::new(&pool);
        qb.select(("o", "orders"), vec![("n", "COUNT(o.id)")])
            .inner_join(("c", "customers"), ("o.customer_id", "c.id"))
            .where_(vec![cmp("c.country", "IN", vec!["DE", "FR"])])
            .group_by("c.id")
            .having(("COUNT(o.id)", ">", 3));
        assert_eq!(qb.sql().matches('?').count(), qb.params().len());
        assert_eq!(
            qb.params(),
            &[Value::from("DE"), Value::from("FR"), Value::I32(3)]
        );
    }
}
