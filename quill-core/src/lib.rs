//! Quill Core - a fluent SQL statement builder with positional parameters
//!
//! Statements are assembled by chaining verbs on a [`QueryBuilder`] that
//! borrows an already connected [`ConnectionPool`]. Identifiers are quoted
//! with backticks and every value travels as a `?` parameter. Verbs never
//! break the chain: failures are recorded on the builder and inspected with
//! [`QueryBuilder::has_error`] / [`QueryBuilder::error_message`].

pub mod builder;
pub mod error;
pub mod executor;
pub mod operator;
pub mod value;

// Re-export main types
pub use builder::{
    and, cmp, compile_condition, not, or, AliasKey, BuildPhase, BuilderState, CompiledCondition,
    Comparison, ConditionEntry, ConditionNode, FetchMode, Fetched, FieldItem, FieldSpec,
    InsertData, IntoCondition, IntoFields, IntoInsertData, IntoJoinOn, IntoLike, IntoSortFields,
    IntoTable, IntoUpdateData, JoinOn, JoinType, LikeSpec, QueryBuilder, SortDirection,
    StatementKind, TableSpec,
};
pub use error::{Error, Result};
pub use executor::{add_semicolon, ConnectionPool, ExecuteOutcome};
pub use operator::{op, LogicKeyword, Operator};
pub use value::{Row, Value};

#[cfg(feature = "sqlite")]
pub use executor::sqlite::SqlitePool;
