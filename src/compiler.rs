//! 子句编译器：把 [`QueryState`] 的各部分渲染为 SQL 片段。
//!
//! 每个函数只负责一个子句族，缺省的可选子句渲染为空字符串；
//! 语句级的顺序由 `statement` 模块固定。

use crate::condition::{Condition, ConditionNode, Operand, Operator};
use crate::error::{DatabaseError, Result};
use crate::escape::Escaper;
use crate::flavor::Flavor;
use crate::literal::EscapeError;
use crate::state::{Direction, QueryState};
use crate::string_builder::StringBuilder;
use crate::table::{TableRef, TableSource};

pub(crate) struct Compiler<'a> {
    pub(crate) esc: Escaper<'a>,
    /// 限定符改写：`from.col` 渲染为 `to.col`（`to` 尚未加引号）。
    qualifiers: Vec<(String, String)>,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(esc: Escaper<'a>) -> Self {
        Self {
            esc,
            qualifiers: Vec::new(),
        }
    }

    /// 有前缀时，主表与 JOIN 中未起别名的物理表作限定符时同样加前缀。
    pub(crate) fn qualifying(mut self, state: &QueryState) -> Self {
        if self.esc.prefix().is_empty() {
            return self;
        }
        let tables = state.table.iter().chain(state.joins.iter().map(|j| &j.table));
        for table in tables.filter(|t| t.alias.is_none()) {
            if let Some(name) = table.name() {
                let prefixed = self.esc.table(name, false);
                self = self.rewriting_qualifier(name, &prefixed);
            }
        }
        self
    }

    pub(crate) fn rewriting_qualifier(mut self, from: &str, to: &str) -> Self {
        if from != to && !self.qualifiers.iter().any(|(f, _)| f == from) {
            self.qualifiers.push((from.to_string(), to.to_string()));
        }
        self
    }

    fn requalify(&self, token: &str) -> Option<String> {
        let (qualifier, rest) = token.split_once('.')?;
        let (_, to) = self.qualifiers.iter().find(|(from, _)| from == qualifier)?;
        Some(format!("{to}.{rest}"))
    }

    /// `SELECT [DISTINCT] a, b`，未指定字段时为 `*`。
    pub(crate) fn select_fields(&self, state: &QueryState) -> String {
        let mut buf = StringBuilder::new();
        buf.write_str("SELECT");
        if state.distinct {
            buf.write_str(" DISTINCT");
        }
        buf.write_str(" ");
        if state.select.is_empty() {
            buf.write_str("*");
        } else {
            let fields = state
                .select
                .iter()
                .map(|f| self.column(&f.expr, f.escape))
                .collect::<Vec<_>>();
            buf.write_str(&fields.join(", "));
        }
        buf.into_string()
    }

    /// 主表（或子查询）及其别名；别名使用字面 `As`。
    pub(crate) fn table_ref(&self, table: &TableRef) -> Result<String> {
        let mut out = match &table.source {
            TableSource::Name(name) => self.esc.table(name, true),
            TableSource::Subquery(inner) => {
                let sql = crate::statement::select(self.esc, inner)?;
                format!("({sql})")
            }
        };
        if let Some(alias) = &table.alias {
            out.push_str(" As ");
            out.push_str(&self.esc.identifier(alias, true));
        }
        Ok(out)
    }

    pub(crate) fn require_table<'s>(&self, state: &'s QueryState) -> Result<&'s TableRef> {
        state.table.as_ref().ok_or(DatabaseError::TableNotDefined)
    }

    pub(crate) fn from(&self, state: &QueryState) -> Result<String> {
        let table = self.require_table(state)?;
        Ok(format!("FROM {}", self.table_ref(table)?))
    }

    pub(crate) fn joins(&self, state: &QueryState) -> Result<String> {
        let mut buf = StringBuilder::new();
        for join in &state.joins {
            if let Some(kind) = join.kind {
                buf.write_leading(kind.as_str());
            }
            buf.write_leading("JOIN ");
            buf.write_str(&self.table_ref(&join.table)?);
            if !join.on.trim().is_empty() {
                buf.write_str(" ON ");
                buf.write_str(&self.expression(&join.on, join.escape));
            }
        }
        Ok(buf.into_string())
    }

    pub(crate) fn where_clause(&self, state: &QueryState) -> Result<String> {
        self.conditions("WHERE", &state.wheres)
    }

    pub(crate) fn having_clause(&self, state: &QueryState) -> Result<String> {
        self.conditions("HAVING", &state.havings)
    }

    /// 按插入顺序渲染条件；首个条件（以及分组内首个条件）不带连接词。
    fn conditions(&self, keyword: &str, nodes: &[ConditionNode]) -> Result<String> {
        if nodes.is_empty() {
            return Ok(String::new());
        }
        let mut out = String::from(keyword);
        out.push(' ');
        let mut need_connector = false;
        let mut depth = 0usize;
        for node in nodes {
            match node {
                ConditionNode::GroupStart { connector, negate } => {
                    if need_connector {
                        out.push(' ');
                        out.push_str(connector.as_str());
                        out.push(' ');
                    }
                    if *negate {
                        out.push_str("NOT ");
                    }
                    out.push('(');
                    depth += 1;
                    need_connector = false;
                }
                ConditionNode::GroupEnd => {
                    if depth == 0 {
                        return Err(DatabaseError::malformed(format!(
                            "{keyword} group closed without being opened"
                        )));
                    }
                    out.push(')');
                    depth -= 1;
                    need_connector = true;
                }
                ConditionNode::Cond { connector, cond } => {
                    if need_connector {
                        out.push(' ');
                        out.push_str(connector.as_str());
                        out.push(' ');
                    }
                    out.push_str(&self.condition(cond)?);
                    need_connector = true;
                }
            }
        }
        if depth != 0 {
            return Err(DatabaseError::malformed(format!(
                "{keyword} group opened but never closed"
            )));
        }
        Ok(out)
    }

    pub(crate) fn column(&self, field: &str, escape: bool) -> String {
        match self.requalify(field) {
            Some(field) => self.esc.identifier(&field, escape),
            None => self.esc.identifier(field, escape),
        }
    }

    /// JOIN ON 之类的表达式：逐个 token 改写限定符后再交给转义器。
    fn expression(&self, expr: &str, escape: bool) -> String {
        if self.qualifiers.is_empty() {
            return self.esc.expression(expr, escape);
        }
        let rewritten = expr
            .split(' ')
            .map(|tok| self.requalify(tok).unwrap_or_else(|| tok.to_string()))
            .collect::<Vec<_>>()
            .join(" ");
        self.esc.expression(&rewritten, escape)
    }

    fn condition(&self, cond: &Condition) -> Result<String> {
        let Some(operand) = &cond.operand else {
            return Ok(self.esc.expression(&cond.field, cond.escape));
        };
        let field = self.column(&cond.field, cond.escape);

        if operand.is_null() {
            let rendered = match cond.operator {
                Operator::Eq | Operator::Is => format!("{field} IS NULL"),
                Operator::NotEq | Operator::IsNot => format!("{field} IS NOT NULL"),
                op => format!("{field} {op} NULL"),
            };
            return Ok(rendered);
        }

        let op = cond.operator;
        let rhs = match operand {
            Operand::List(values) => {
                if values.is_empty() {
                    return Err(DatabaseError::malformed(format!(
                        "IN list for `{}` is empty",
                        cond.field
                    )));
                }
                let items = values
                    .iter()
                    .map(|v| self.esc.value(v, cond.escape))
                    .collect::<Result<Vec<_>>>()?;
                let op = match op {
                    Operator::Eq | Operator::In => Operator::In,
                    Operator::NotEq | Operator::NotIn => Operator::NotIn,
                    other => {
                        return Err(DatabaseError::malformed(format!(
                            "operator `{other}` cannot take a value list"
                        )));
                    }
                };
                return Ok(format!("{field} {op} ({})", items.join(", ")));
            }
            other => self.operand(other, cond.escape)?,
        };
        Ok(format!("{field} {op} {rhs}"))
    }

    /// 单值操作数（SET 与条件共用）。
    pub(crate) fn operand(&self, operand: &Operand, escape: bool) -> Result<String> {
        match operand {
            Operand::Value(v) => self.esc.value(v, escape),
            Operand::Valuer(v) => {
                let value = v.value().map_err(EscapeError::from)?;
                self.esc.value(&value, escape)
            }
            Operand::Raw(s) => Ok(s.clone()),
            Operand::List(_) => Err(DatabaseError::malformed(
                "a value list is only allowed in IN conditions",
            )),
        }
    }

    pub(crate) fn group_by(&self, state: &QueryState) -> String {
        if state.group_by.is_empty() {
            return String::new();
        }
        let cols = state
            .group_by
            .iter()
            .map(|c| self.column(c, true))
            .collect::<Vec<_>>();
        format!("GROUP BY {}", cols.join(", "))
    }

    pub(crate) fn order_by(&self, state: &QueryState) -> String {
        if state.order_by.is_empty() {
            return String::new();
        }
        let items = state
            .order_by
            .iter()
            .map(|o| match o.direction {
                Direction::Random => self.esc.flavor().random_function().to_string(),
                Direction::Asc => format!("{} ASC", self.column(&o.field, o.escape)),
                Direction::Desc => format!("{} DESC", self.column(&o.field, o.escape)),
            })
            .collect::<Vec<_>>();
        format!("ORDER BY {}", items.join(", "))
    }

    /// SELECT 的分页子句，位置与写法由 flavor 决定。
    pub(crate) fn limit_offset(&self, state: &QueryState) -> String {
        let flavor = self.esc.flavor();
        let mut buf = StringBuilder::new();
        if state.limit.is_none() && state.offset.is_none() {
            return String::new();
        }

        if flavor.uses_fetch_next() {
            if state.order_by.is_empty() && flavor == Flavor::SQLServer {
                buf.write_leading("ORDER BY 1");
            }
            buf.write_leading(&format!("OFFSET {} ROWS", state.offset.unwrap_or(0)));
            if let Some(lim) = state.limit {
                buf.write_leading(&format!("FETCH NEXT {lim} ROWS ONLY"));
            }
            return buf.into_string();
        }

        match (state.limit, state.offset) {
            (Some(lim), off) => {
                buf.write_leading(&format!("LIMIT {lim}"));
                if let Some(off) = off {
                    buf.write_leading(&format!("OFFSET {off}"));
                }
            }
            (None, Some(off)) => match flavor {
                // MySQL 与 SQLite 的 OFFSET 必须跟在 LIMIT 之后
                Flavor::MySQL => {
                    buf.write_leading(&format!("LIMIT {} OFFSET {off}", u64::MAX))
                }
                Flavor::SQLite => buf.write_leading(&format!("LIMIT -1 OFFSET {off}")),
                _ => buf.write_leading(&format!("OFFSET {off}")),
            },
            (None, None) => {}
        }
        buf.into_string()
    }

    /// UPDATE/DELETE 只支持简单的 `LIMIT n`。
    pub(crate) fn write_limit(&self, state: &QueryState) -> String {
        state
            .limit
            .map(|n| format!("LIMIT {n}"))
            .unwrap_or_default()
    }
}
