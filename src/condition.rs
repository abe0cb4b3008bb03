//! Condition：WHERE/HAVING 条件节点，以及 `"id >"` 这类字段写法的解析。

use crate::error::{DatabaseError, Result};
use crate::value::SqlValue;
use crate::valuer::SqlValuer;
use std::fmt;

/// 条件之间的连接词。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// 比较运算符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    In,
    NotIn,
    Is,
    IsNot,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
        }
    }

    /// 识别运算符文本（大小写不敏感，多余空白会被折叠）。
    pub fn parse(s: &str) -> Option<Self> {
        let norm = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        let op = match norm.as_str() {
            "=" => Self::Eq,
            "!=" | "<>" => Self::NotEq,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "LIKE" => Self::Like,
            "NOT LIKE" => Self::NotLike,
            "IN" => Self::In,
            "NOT IN" => Self::NotIn,
            "IS" => Self::Is,
            "IS NOT" => Self::IsNot,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 条件右侧的操作数。
#[derive(Debug, Clone)]
pub enum Operand {
    Value(SqlValue),
    Valuer(Box<dyn SqlValuer>),
    /// 原样拼接的 SQL 片段，如 `now() - INTERVAL 1 DAY`。
    Raw(String),
    /// `IN (...)` 的值列表。
    List(Vec<SqlValue>),
}

impl PartialEq for Operand {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Raw(a), Self::Raw(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Operand {
    pub fn raw(expr: impl Into<String>) -> Self {
        Self::Raw(expr.into())
    }

    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Self::Value(SqlValue::Null))
    }
}

macro_rules! impl_operand_from_value {
    ($($t:ty),* $(,)?) => {
        $(impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Self::Value(v.into())
            }
        })*
    };
}

impl_operand_from_value!(
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    &'static str,
    Vec<u8>,
    time::OffsetDateTime,
    SqlValue,
);

impl From<Box<dyn SqlValuer>> for Operand {
    fn from(v: Box<dyn SqlValuer>) -> Self {
        Self::Valuer(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Self::Value(SqlValue::from_option(v))
    }
}

/// LIKE 通配符添加的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikeSide {
    Before,
    After,
    #[default]
    Both,
    None,
}

impl LikeSide {
    pub(crate) fn wrap(self, s: &str) -> String {
        match self {
            Self::Before => format!("%{s}"),
            Self::After => format!("{s}%"),
            Self::Both => format!("%{s}%"),
            Self::None => s.to_string(),
        }
    }
}

/// 一个比较条件。`operand` 为 `None` 时 `field` 本身就是完整表达式（如 `1=1`）。
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub operand: Option<Operand>,
    pub escape: bool,
}

/// 条件树按插入顺序扁平存放；分组用起止节点表示。
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Cond {
        connector: Connector,
        cond: Condition,
    },
    GroupStart {
        connector: Connector,
        negate: bool,
    },
    GroupEnd,
}

impl Condition {
    /// 由 `"field op"` 与操作数构造条件。
    pub fn parse(field: &str, operand: Operand, escape: bool) -> Result<Self> {
        let (field, operator) = parse_field(field)?;
        Ok(Self {
            field,
            operator: operator.unwrap_or_default(),
            operand: Some(operand),
            escape,
        })
    }

    pub fn raw(expr: impl Into<String>, escape: bool) -> Self {
        Self {
            field: expr.into(),
            operator: Operator::Eq,
            operand: None,
            escape,
        }
    }

    pub fn with_operator(
        field: impl Into<String>,
        operator: Operator,
        operand: Operand,
        escape: bool,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            operand: Some(operand),
            escape,
        }
    }
}

/// 把 `"id >"`、`"name NOT LIKE"`、`"LOWER(name) ="` 拆成字段与运算符。
///
/// 没有运算符时返回 `None`（由调用方按 `=` 处理）；运算符之后还有多余内容时报错。
pub fn parse_field(field: &str) -> Result<(String, Option<Operator>)> {
    let s = field.trim();
    let mut depth = 0i32;
    let mut split = s.len();
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(DatabaseError::malformed(format!(
                        "unbalanced `)` in field `{field}`"
                    )));
                }
            }
            c if depth == 0 && (c.is_whitespace() || matches!(c, '<' | '>' | '=' | '!')) => {
                split = i;
                break;
            }
            _ => {}
        }
    }

    let (column, rest) = s.split_at(split);
    if column.is_empty() || depth != 0 {
        return Err(DatabaseError::malformed(format!(
            "cannot parse field `{field}`"
        )));
    }
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok((column.to_string(), None));
    }
    match Operator::parse(rest) {
        Some(op) => Ok((column.to_string(), Some(op))),
        None => Err(DatabaseError::malformed(format!(
            "unknown operator `{rest}` in `{field}`"
        ))),
    }
}
