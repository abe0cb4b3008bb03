//! halo-query：面向单个数据库连接的链式 SQL 查询构建器。
//!
//! 链式方法累积子句，终止调用（`get`、`count`、`insert`、`update`、`delete` 等）
//! 一次性渲染并执行；测试模式下终止调用只返回 SQL 文本。

pub mod builder;
#[cfg(test)]
mod builder_tests;
pub mod cache;
mod compiler;
pub mod condition;
pub mod connection;
pub mod error;
pub mod escape;
pub mod flavor;
pub mod literal;
#[cfg(test)]
mod literal_tests;
pub mod macros;
pub use crate::macros::*;
#[cfg(test)]
mod macros_tests;
pub mod mock;
pub mod result;
pub mod state;
pub mod statement;
mod string_builder;
pub mod table;
pub mod value;
pub mod valuer;

pub use crate::builder::QueryBuilder;
pub use crate::cache::{MemoryCache, QueryCache};
pub use crate::condition::{
    Condition, ConditionNode, Connector, LikeSide, Operand, Operator, parse_field,
};
pub use crate::connection::{Connection, ConnectionConfig, ConnectionError};
pub use crate::error::{DatabaseError, Result};
pub use crate::escape::is_expression;
pub use crate::flavor::{
    DefaultFlavorGuard, Flavor, default_flavor, set_default_flavor, set_default_flavor_scoped,
};
pub use crate::literal::{EscapeError, encode_literal};
pub use crate::mock::MockConnection;
pub use crate::result::{ExecResult, ResultSet, Row};
pub use crate::state::{Direction, JoinClause, JoinType, OrderBy, QueryState, SelectField, SetValue};
pub use crate::statement::{Aggregate, COUNT_SUBQUERY_ALIAS, StatementKind};
pub use crate::table::{TableRef, TableSource};
pub use crate::value::SqlValue;
pub use crate::valuer::{SqlValuer, ValuerError};
