use quill_core::{
    and, cmp, op, or, ConnectionPool, ExecuteOutcome, FieldItem, QueryBuilder, Result, Row, Value,
};

/// Pool that prints every statement instead of talking to a database
struct PrintingPool;

impl PrintingPool {
    fn print(&self, sql: &str, params: &[Value]) {
        println!("{}", sql);
        println!("  params: {:?}", params);
    }
}

impl ConnectionPool for PrintingPool {
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecuteOutcome> {
        self.print(sql, params);
        Ok(ExecuteOutcome {
            rows_affected: 1,
            last_insert_id: Some(1),
        })
    }

    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.print(sql, params);
        Ok(Vec::new())
    }

    async fn fetch_optional(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        self.print(sql, params);
        Ok(None)
    }
}

#[tokio::main]
async fn main() {
    let pool = PrintingPool;
    let mut qb = QueryBuilder::new(&pool);

    // SELECT with aliases, a join and a structured condition
    qb.select(("u", "users"), vec![FieldItem::bare("u.id"), FieldItem::aliased("author", "u.name")])
        .left_join(("p", "posts"), ("u.id", "p.author_id"))
        .where_(vec![
            cmp("u.age", op::GT, 18),
            and(),
            cmp("u.status", "IN", vec!["active", "trial"]),
        ])
        .order_by("u.name DESC", "")
        .limit(10)
        .offset(5)
        .all()
        .await;

    // INSERT, single row and multi-row
    let id = qb
        .insert("users", vec![("name", Value::from("John Doe")), ("age", Value::I32(30))])
        .go()
        .await;
    println!("  last insert id: {:?}", id);

    qb.insert("tags", (vec!["name"], vec![vec!["rust"], vec!["sql"]]))
        .go()
        .await;

    // UPDATE
    qb.update("users", vec![("email", "newemail@example.com")])
        .where_(vec![cmp("id", "=", 123), or(), cmp("legacy_id", "=", 77)])
        .go()
        .await;

    // DELETE with a raw condition
    qb.delete("sessions")
        .where_("expires_at < CURRENT_TIMESTAMP")
        .go()
        .await;

    // Aggregates
    qb.select("orders", vec![("customer", "customer_id"), ("total", "SUM(amount)")])
        .group_by("customer_id")
        .having(("SUM(amount)", ">", 100))
        .all()
        .await;

    // Errors are recorded, not raised
    qb.where_(("id", "=", 1));
    println!("error after finalized statement: {}", qb.error_message());

    qb.select("users", "").all().await;
    println!("error on empty fields: {}", qb.error_message());
}
