//! QueryState：尚未渲染的查询子句累积区。

use crate::condition::{ConditionNode, Operand};
use crate::error::DatabaseError;
use crate::table::TableRef;

/// JOIN 类型；`None` 渲染为不带修饰的 `JOIN`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Outer,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Outer => "OUTER",
            Self::LeftOuter => "LEFT OUTER",
            Self::RightOuter => "RIGHT OUTER",
            Self::FullOuter => "FULL OUTER",
            Self::Cross => "CROSS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub table: TableRef,
    pub on: String,
    pub kind: Option<JoinType>,
    pub escape: bool,
}

/// 排序方向。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
    Random,
}

impl Direction {
    /// 大小写不敏感；空字符串视为 ASC。
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "" | "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "RANDOM" => Some(Self::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
    pub escape: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectField {
    pub expr: String,
    pub escape: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetValue {
    pub column: String,
    pub operand: Operand,
    pub escape: bool,
}

/// 一次查询累积下来的全部子句。终止调用后（除非保留）会被重置为默认值。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryState {
    pub table: Option<TableRef>,
    pub select: Vec<SelectField>,
    pub distinct: bool,
    pub ignore: bool,
    pub joins: Vec<JoinClause>,
    pub wheres: Vec<ConditionNode>,
    pub havings: Vec<ConditionNode>,
    pub group_by: Vec<String>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub set: Vec<SetValue>,
    /// 第一个解析失败的子句；下一次终止调用会返回它。
    pub(crate) error: Option<DatabaseError>,
}

impl QueryState {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 写入 SET 数据；同名列后写覆盖先写，保持首次出现的位置。
    pub(crate) fn put_set(&mut self, value: SetValue) {
        match self.set.iter_mut().find(|s| s.column == value.column) {
            Some(slot) => *slot = value,
            None => self.set.push(value),
        }
    }

    pub(crate) fn record_error(&mut self, err: DatabaseError) {
        tracing::warn!(error = %err, "query builder clause rejected");
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// 是否需要把 COUNT 改写为子查询。
    pub(crate) fn needs_count_subquery(&self) -> bool {
        self.distinct || !self.group_by.is_empty()
    }
}
