//! Query builder module

pub mod common;
pub mod condition;
pub mod delete;
pub mod insert;
pub mod normalize;
pub mod query;
pub mod select;
pub mod update;

// Re-export types from submodules
pub use common::{BuildPhase, FetchMode, JoinType, SortDirection, StatementKind};
pub use condition::{
    and, cmp, compile_condition, not, or, CompiledCondition, Comparison, ConditionEntry,
    ConditionNode, IntoCondition,
};
pub use insert::{InsertData, IntoInsertData};
pub use normalize::{AliasKey, FieldItem, FieldSpec, IntoFields, IntoTable, TableSpec};
pub use query::{BuilderState, Fetched, IntoLike, LikeSpec, QueryBuilder};
pub use select::{IntoJoinOn, IntoSortFields, JoinOn};
pub use update::IntoUpdateData;
