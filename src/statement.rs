//! 语句组装：按固定顺序拼接子句片段，得到完整语句。
//!
//! 所有组装函数先做前置检查（未解析的子句错误、缺表），再调用任何子句编译器。

use crate::compiler::Compiler;
use crate::error::{DatabaseError, Result};
use crate::escape::Escaper;
use crate::state::{QueryState, SetValue};
use crate::string_builder::StringBuilder;
use crate::table::{TableRef, generated_alias};
use std::fmt;

/// 分组计数子查询的固定别名。
pub const COUNT_SUBQUERY_ALIAS: &str = "BLITZ_count_all_results";

/// 终止调用对应的语句类型，用于日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Count,
    Aggregate,
    Insert,
    Replace,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Select => "select",
            Self::Count => "count",
            Self::Aggregate => "aggregate",
            Self::Insert => "insert",
            Self::Replace => "replace",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(s)
    }
}

impl StatementKind {
    /// 写语句在执行模式下返回 `Written`。
    pub fn is_write(self) -> bool {
        matches!(
            self,
            Self::Insert | Self::Replace | Self::Update | Self::Delete
        )
    }
}

/// 聚合函数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl Aggregate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Count => "COUNT",
        }
    }

    /// `FUNC(field) As alias`，未给别名时取字段最后一段。
    pub(crate) fn projection(self, field: &str, alias: Option<&str>) -> String {
        let alias = alias
            .map(str::to_string)
            .unwrap_or_else(|| default_alias(field));
        format!("{}({field}) As {alias}", self.as_str())
    }
}

fn default_alias(field: &str) -> String {
    let last = field.rsplit('.').next().unwrap_or(field);
    if last.chars().all(|c| c.is_alphanumeric() || c == '_') && !last.is_empty() {
        last.to_string()
    } else {
        "aggregate".to_string()
    }
}

fn check_pending(state: &QueryState) -> Result<()> {
    match &state.error {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

fn require_table(state: &QueryState) -> Result<&TableRef> {
    check_pending(state)?;
    state.table.as_ref().ok_or(DatabaseError::TableNotDefined)
}

/// 写语句的目标必须是物理表。
fn require_physical_table(state: &QueryState) -> Result<&str> {
    let table = require_table(state)?;
    table
        .name()
        .ok_or_else(|| DatabaseError::malformed("cannot write into a subquery"))
}

/// SELECT 字段、FROM、JOIN、WHERE、GROUP BY、HAVING、ORDER BY、LIMIT/OFFSET。
pub(crate) fn select(esc: Escaper<'_>, state: &QueryState) -> Result<String> {
    require_table(state)?;
    let c = Compiler::new(esc).qualifying(state);
    let mut buf = StringBuilder::new();
    buf.write_leading(&c.select_fields(state));
    buf.write_leading(&c.from(state)?);
    buf.write_leading(&c.joins(state)?);
    buf.write_leading(&c.where_clause(state)?);
    buf.write_leading(&c.group_by(state));
    buf.write_leading(&c.having_clause(state)?);
    buf.write_leading(&c.order_by(state));
    buf.write_leading(&c.limit_offset(state));
    Ok(buf.into_string())
}

/// COUNT：有 GROUP BY（或 DISTINCT）时先把查询包成子查询再计数。
///
/// `seq` 参与自动别名的哈希，同一 builder 上的多次调用得到不同别名。
pub(crate) fn count(
    esc: Escaper<'_>,
    state: &QueryState,
    field: &str,
    seq: u64,
) -> Result<String> {
    require_table(state)?;
    let c = Compiler::new(esc).qualifying(state);

    if !state.needs_count_subquery() {
        let mut buf = StringBuilder::new();
        buf.write_leading(&format!(
            "SELECT COUNT({}) As num_rows",
            c.column(field, true)
        ));
        buf.write_leading(&c.from(state)?);
        buf.write_leading(&c.joins(state)?);
        buf.write_leading(&c.where_clause(state)?);
        buf.write_leading(&c.having_clause(state)?);
        return Ok(buf.into_string());
    }

    let mut inner = state.clone();
    inner.order_by.clear();
    inner.limit = None;
    inner.offset = None;

    let mut renamed = None;
    if !esc.prefix().is_empty()
        && let Some(table) = inner.table.as_mut()
        && table.alias.is_none()
        && let Some(name) = table.name().map(str::to_string)
    {
        let signature = format!("{}|{}", c.where_clause(state)?, c.group_by(state));
        let alias = generated_alias(&name, &signature, seq);
        table.alias = Some(alias.clone());
        renamed = Some((name, alias));
    }

    let mut c = Compiler::new(esc).qualifying(&inner);
    if let Some((name, alias)) = &renamed {
        c = c.rewriting_qualifier(name, alias);
    }

    let mut buf = StringBuilder::new();
    buf.write_leading(&c.select_fields(&inner));
    buf.write_leading(&c.from(&inner)?);
    buf.write_leading(&c.joins(&inner)?);
    buf.write_leading(&c.where_clause(&inner)?);
    buf.write_leading(&c.group_by(&inner));
    buf.write_leading(&c.having_clause(&inner)?);

    Ok(format!(
        "SELECT COUNT(*) As num_rows FROM ( {} ) {COUNT_SUBQUERY_ALIAS}",
        buf.into_string()
    ))
}

/// MIN/MAX/SUM/AVG：替换 SELECT 字段后按普通 SELECT 渲染（不含排序与分页）。
pub(crate) fn aggregate(
    esc: Escaper<'_>,
    state: &QueryState,
    func: Aggregate,
    field: &str,
) -> Result<String> {
    require_table(state)?;
    let c = Compiler::new(esc).qualifying(state);
    let mut buf = StringBuilder::new();
    let alias = default_alias(field);
    buf.write_leading("SELECT ");
    buf.write_str(&func.projection(&c.column(field, true), Some(&alias)));
    buf.write_leading(&c.from(state)?);
    buf.write_leading(&c.joins(state)?);
    buf.write_leading(&c.where_clause(state)?);
    buf.write_leading(&c.group_by(state));
    buf.write_leading(&c.having_clause(state)?);
    Ok(buf.into_string())
}

fn insert_verb(esc: Escaper<'_>, state: &QueryState) -> &'static str {
    if state.ignore {
        esc.flavor().prepare_insert_ignore()
    } else {
        "INSERT"
    }
}

fn values_row(c: &Compiler<'_>, row: &[&SetValue]) -> Result<String> {
    let vals = row
        .iter()
        .map(|s| c.operand(&s.operand, s.escape))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!("({})", vals.join(", ")))
}

fn write_into(
    esc: Escaper<'_>,
    state: &QueryState,
    verb: &str,
    rows: &[Vec<SetValue>],
) -> Result<String> {
    let table = require_physical_table(state)?;
    let Some(first) = rows.first().filter(|r| !r.is_empty()) else {
        return Err(DatabaseError::EmptySet);
    };
    let c = Compiler::new(esc);

    let columns: Vec<&str> = first.iter().map(|s| s.column.as_str()).collect();
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let ordered = columns
            .iter()
            .map(|col| {
                row.iter().find(|s| s.column == *col).ok_or_else(|| {
                    DatabaseError::malformed(format!("batch row is missing column `{col}`"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if row.len() != columns.len() {
            return Err(DatabaseError::malformed(
                "batch rows must share the same columns",
            ));
        }
        values.push(values_row(&c, &ordered)?);
    }

    let cols = first
        .iter()
        .map(|s| esc.identifier(&s.column, s.escape))
        .collect::<Vec<_>>();

    let mut buf = StringBuilder::new();
    buf.write_leading(verb);
    buf.write_leading("INTO ");
    buf.write_str(&esc.table(table, true));
    buf.write_str(&format!(" ({})", cols.join(", ")));
    buf.write_leading("VALUES ");
    buf.write_str(&values.join(", "));
    Ok(buf.into_string())
}

/// INSERT：目标表不带别名；IGNORE 的写法由 flavor 决定。
pub(crate) fn insert(esc: Escaper<'_>, state: &QueryState) -> Result<String> {
    insert_batch(esc, state, std::slice::from_ref(&state.set))
}

/// 多行 INSERT：列顺序以第一行为准。
pub(crate) fn insert_batch(
    esc: Escaper<'_>,
    state: &QueryState,
    rows: &[Vec<SetValue>],
) -> Result<String> {
    let mut sql = write_into(esc, state, insert_verb(esc, state), rows)?;
    if state.ignore
        && let Some(suffix) = esc.flavor().insert_ignore_suffix()
    {
        sql.push(' ');
        sql.push_str(suffix);
    }
    Ok(sql)
}

pub(crate) fn replace(esc: Escaper<'_>, state: &QueryState) -> Result<String> {
    write_into(esc, state, "REPLACE", std::slice::from_ref(&state.set))
}

/// UPDATE：保留别名，之后依次是 SET、WHERE、LIMIT。
pub(crate) fn update(esc: Escaper<'_>, state: &QueryState) -> Result<String> {
    let table = require_table(state)?;
    require_physical_table(state)?;
    if state.set.is_empty() {
        return Err(DatabaseError::EmptySet);
    }
    let c = Compiler::new(esc).qualifying(state);

    let assignments = state
        .set
        .iter()
        .map(|s| {
            Ok(format!(
                "{} = {}",
                esc.identifier(&s.column, s.escape),
                c.operand(&s.operand, s.escape)?
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut buf = StringBuilder::new();
    buf.write_leading("UPDATE");
    if state.ignore && esc.flavor() == crate::flavor::Flavor::MySQL {
        buf.write_leading("IGNORE");
    }
    buf.write_leading(&c.table_ref(table)?);
    buf.write_leading("SET ");
    buf.write_str(&assignments.join(", "));
    buf.write_leading(&c.where_clause(state)?);
    buf.write_leading(&c.write_limit(state));
    Ok(buf.into_string())
}

/// DELETE：总是以裸表名为目标；以别名或表名限定的条件字段被改写为物理表名限定。
pub(crate) fn delete(esc: Escaper<'_>, state: &QueryState) -> Result<String> {
    let table = require_table(state)?;
    let name = require_physical_table(state)?;
    let target = esc.table(name, false);
    let mut c = Compiler::new(esc).rewriting_qualifier(name, &target);
    if let Some(alias) = &table.alias {
        c = c.rewriting_qualifier(alias, &target);
    }

    let mut buf = StringBuilder::new();
    buf.write_leading("DELETE FROM ");
    buf.write_str(&esc.table(name, true));
    buf.write_leading(&c.where_clause(state)?);
    buf.write_leading(&c.write_limit(state));
    Ok(buf.into_string())
}
