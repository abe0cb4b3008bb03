//! QueryBuilder：链式 API。
//!
//! 链式方法只修改 [`QueryState`]，不会渲染 SQL，也不会失败；解析错误记在状态里，
//! 由下一次终止调用返回。终止调用成功后（除非调用过 [`QueryBuilder::preserve`]）
//! 状态被清空，同一个 builder 可以继续构建下一条查询；失败时状态保持不变。

use crate::cache::{QueryCache, cache_key};
use crate::condition::{Condition, ConditionNode, Connector, LikeSide, Operand, Operator};
use crate::connection::Connection;
use crate::error::{DatabaseError, Result};
use crate::escape::Escaper;
use crate::macros::{IntoStrings, collect_into_strings};
use crate::result::{ExecResult, ResultSet};
use crate::state::{Direction, JoinClause, JoinType, OrderBy, QueryState, SelectField, SetValue};
use crate::statement::{self, Aggregate, StatementKind};
use crate::table::TableRef;
use crate::value::SqlValue;
use std::rc::Rc;
use std::time::Duration;

pub struct QueryBuilder {
    conn: Rc<dyn Connection>,
    cache: Option<Rc<dyn QueryCache>>,
    state: QueryState,
    test_mode: bool,
    preserve: bool,
    remember: Option<(String, Duration)>,
    alias_seq: u64,
}

impl std::fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("state", &self.state)
            .field("test_mode", &self.test_mode)
            .field("preserve", &self.preserve)
            .finish_non_exhaustive()
    }
}

impl QueryBuilder {
    pub fn new(conn: Rc<dyn Connection>) -> Self {
        Self {
            conn,
            cache: None,
            state: QueryState::default(),
            test_mode: false,
            preserve: false,
            remember: None,
            alias_seq: 0,
        }
    }

    /// 等价于 `QueryBuilder::new(conn).from(table)`。
    pub fn table(conn: Rc<dyn Connection>, table: &str) -> Self {
        let mut qb = Self::new(conn);
        qb.from(table);
        qb
    }

    pub fn with_cache(mut self, cache: Rc<dyn QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 绑定的连接。
    pub fn db(&self) -> &Rc<dyn Connection> {
        &self.conn
    }

    /// 测试模式下所有终止调用都只返回 SQL，不会触达连接。
    pub fn test_mode(&mut self, on: bool) -> &mut Self {
        self.test_mode = on;
        self
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// 清空累积的子句。
    pub fn reset(&mut self) -> &mut Self {
        tracing::trace!("query builder state reset");
        self.state = QueryState::default();
        self.remember = None;
        self.preserve = false;
        self
    }

    /// 下一次终止调用不清空状态。
    pub fn preserve(&mut self) -> &mut Self {
        self.preserve = true;
        self
    }

    // ---- SELECT ----

    /// 追加查询字段。`"a, b"` 会按逗号拆开，含括号的表达式保持原样。
    pub fn select<T: IntoStrings>(&mut self, fields: T) -> &mut Self {
        self.select_with(fields, true)
    }

    pub fn select_with<T: IntoStrings>(&mut self, fields: T, escape: bool) -> &mut Self {
        for field in collect_into_strings(fields) {
            if field.contains('(') {
                self.push_select(field.trim(), escape);
            } else {
                for part in field.split(',') {
                    self.push_select(part.trim(), escape);
                }
            }
        }
        self
    }

    fn push_select(&mut self, expr: &str, escape: bool) {
        if expr.is_empty() {
            return;
        }
        self.state.select.push(SelectField {
            expr: expr.to_string(),
            escape,
        });
    }

    fn select_aggregate(&mut self, func: Aggregate, field: &str, alias: Option<&str>) -> &mut Self {
        let expr = func.projection(field, alias);
        self.push_select(&expr, false);
        self
    }

    pub fn select_max(&mut self, field: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate(Aggregate::Max, field, alias)
    }

    pub fn select_min(&mut self, field: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate(Aggregate::Min, field, alias)
    }

    pub fn select_avg(&mut self, field: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate(Aggregate::Avg, field, alias)
    }

    pub fn select_sum(&mut self, field: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate(Aggregate::Sum, field, alias)
    }

    pub fn select_count(&mut self, field: &str, alias: Option<&str>) -> &mut Self {
        self.select_aggregate(Aggregate::Count, field, alias)
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.state.distinct = true;
        self
    }

    /// INSERT IGNORE（MySQL 下 UPDATE 也生效）。
    pub fn ignore(&mut self) -> &mut Self {
        self.state.ignore = true;
        self
    }

    // ---- FROM / JOIN ----

    /// 设置主表，支持 `jobs j` 与 `jobs As j`。
    pub fn from(&mut self, table: &str) -> &mut Self {
        match TableRef::parse(table) {
            Ok(t) => self.state.table = Some(t),
            Err(e) => self.state.record_error(e),
        }
        self
    }

    /// 以另一个 builder 的 SELECT 作为 FROM 来源；`sub` 的状态不受影响。
    pub fn from_subquery(&mut self, sub: &QueryBuilder, alias: &str) -> &mut Self {
        self.state.table = Some(TableRef::subquery(sub.state.clone(), alias));
        self
    }

    pub fn join(&mut self, table: &str, on: &str) -> &mut Self {
        self.push_join(None, table, on)
    }

    pub fn join_with(&mut self, kind: JoinType, table: &str, on: &str) -> &mut Self {
        self.push_join(Some(kind), table, on)
    }

    pub fn inner_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.push_join(Some(JoinType::Inner), table, on)
    }

    pub fn left_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.push_join(Some(JoinType::Left), table, on)
    }

    pub fn right_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.push_join(Some(JoinType::Right), table, on)
    }

    fn push_join(&mut self, kind: Option<JoinType>, table: &str, on: &str) -> &mut Self {
        match TableRef::parse(table) {
            Ok(table) => self.state.joins.push(JoinClause {
                table,
                on: on.to_string(),
                kind,
                escape: true,
            }),
            Err(e) => self.state.record_error(e),
        }
        self
    }

    // ---- WHERE ----

    fn push_condition(
        nodes: &mut Vec<ConditionNode>,
        connector: Connector,
        cond: Result<Condition>,
    ) -> std::result::Result<(), DatabaseError> {
        let cond = cond?;
        nodes.push(ConditionNode::Cond { connector, cond });
        Ok(())
    }

    fn add_where(&mut self, connector: Connector, cond: Result<Condition>) -> &mut Self {
        if let Err(e) = Self::push_condition(&mut self.state.wheres, connector, cond) {
            self.state.record_error(e);
        }
        self
    }

    fn add_having(&mut self, connector: Connector, cond: Result<Condition>) -> &mut Self {
        if let Err(e) = Self::push_condition(&mut self.state.havings, connector, cond) {
            self.state.record_error(e);
        }
        self
    }

    /// `where_("id >", 3)`；字段里没写运算符时按 `=`，值为 NULL 时渲染 `IS NULL`。
    pub fn where_(&mut self, field: &str, value: impl Into<Operand>) -> &mut Self {
        self.where_with(field, value, true)
    }

    pub fn where_with(&mut self, field: &str, value: impl Into<Operand>, escape: bool) -> &mut Self {
        let cond = Condition::parse(field, value.into(), escape);
        self.add_where(Connector::And, cond)
    }

    pub fn or_where(&mut self, field: &str, value: impl Into<Operand>) -> &mut Self {
        self.or_where_with(field, value, true)
    }

    pub fn or_where_with(
        &mut self,
        field: &str,
        value: impl Into<Operand>,
        escape: bool,
    ) -> &mut Self {
        let cond = Condition::parse(field, value.into(), escape);
        self.add_where(Connector::Or, cond)
    }

    /// 原样追加一段条件表达式，如 `where_raw("1=1")`。
    pub fn where_raw(&mut self, expr: &str) -> &mut Self {
        self.add_where(Connector::And, Ok(Condition::raw(expr, false)))
    }

    pub fn or_where_raw(&mut self, expr: &str) -> &mut Self {
        self.add_where(Connector::Or, Ok(Condition::raw(expr, false)))
    }

    /// 把键值对逐项展开为 AND 条件。
    pub fn where_map<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        for (k, v) in pairs {
            self.where_(k.as_ref(), v);
        }
        self
    }

    fn add_in(
        &mut self,
        connector: Connector,
        field: &str,
        values: Vec<SqlValue>,
        not: bool,
    ) -> &mut Self {
        let op = if not { Operator::NotIn } else { Operator::In };
        let cond = Condition::with_operator(field, op, Operand::List(values), true);
        self.add_where(connector, Ok(cond))
    }

    pub fn where_in<V: Into<SqlValue>>(
        &mut self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(Connector::And, field, values, false)
    }

    pub fn where_not_in<V: Into<SqlValue>>(
        &mut self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(Connector::And, field, values, true)
    }

    pub fn or_where_in<V: Into<SqlValue>>(
        &mut self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(Connector::Or, field, values, false)
    }

    pub fn or_where_not_in<V: Into<SqlValue>>(
        &mut self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        let values = values.into_iter().map(Into::into).collect();
        self.add_in(Connector::Or, field, values, true)
    }

    fn add_like(
        &mut self,
        connector: Connector,
        field: &str,
        pattern: &str,
        side: LikeSide,
        not: bool,
    ) -> &mut Self {
        let op = if not { Operator::NotLike } else { Operator::Like };
        let value = SqlValue::from(side.wrap(pattern));
        let cond = Condition::with_operator(field, op, Operand::Value(value), true);
        self.add_where(connector, Ok(cond))
    }

    pub fn like(&mut self, field: &str, pattern: &str, side: LikeSide) -> &mut Self {
        self.add_like(Connector::And, field, pattern, side, false)
    }

    pub fn not_like(&mut self, field: &str, pattern: &str, side: LikeSide) -> &mut Self {
        self.add_like(Connector::And, field, pattern, side, true)
    }

    pub fn or_like(&mut self, field: &str, pattern: &str, side: LikeSide) -> &mut Self {
        self.add_like(Connector::Or, field, pattern, side, false)
    }

    pub fn or_not_like(&mut self, field: &str, pattern: &str, side: LikeSide) -> &mut Self {
        self.add_like(Connector::Or, field, pattern, side, true)
    }

    // ---- 条件分组 ----

    fn open_group(&mut self, connector: Connector, negate: bool) -> &mut Self {
        self.state
            .wheres
            .push(ConditionNode::GroupStart { connector, negate });
        self
    }

    pub fn group_start(&mut self) -> &mut Self {
        self.open_group(Connector::And, false)
    }

    pub fn or_group_start(&mut self) -> &mut Self {
        self.open_group(Connector::Or, false)
    }

    pub fn not_group_start(&mut self) -> &mut Self {
        self.open_group(Connector::And, true)
    }

    pub fn or_not_group_start(&mut self) -> &mut Self {
        self.open_group(Connector::Or, true)
    }

    pub fn group_end(&mut self) -> &mut Self {
        self.state.wheres.push(ConditionNode::GroupEnd);
        self
    }

    // ---- GROUP BY / HAVING / ORDER BY / LIMIT ----

    /// 接受单个字段、逗号分隔的字符串或字段列表。
    pub fn group_by<T: IntoStrings>(&mut self, fields: T) -> &mut Self {
        for field in collect_into_strings(fields) {
            self.state.group_by.extend(
                field
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string),
            );
        }
        self
    }

    pub fn having(&mut self, field: &str, value: impl Into<Operand>) -> &mut Self {
        let cond = Condition::parse(field, value.into(), true);
        self.add_having(Connector::And, cond)
    }

    pub fn or_having(&mut self, field: &str, value: impl Into<Operand>) -> &mut Self {
        let cond = Condition::parse(field, value.into(), true);
        self.add_having(Connector::Or, cond)
    }

    /// `having_raw("1=1")`。
    pub fn having_raw(&mut self, expr: &str) -> &mut Self {
        self.add_having(Connector::And, Ok(Condition::raw(expr, false)))
    }

    pub fn or_having_raw(&mut self, expr: &str) -> &mut Self {
        self.add_having(Connector::Or, Ok(Condition::raw(expr, false)))
    }

    /// 方向大小写不敏感：`asc` / `desc` / `random`，空字符串为 ASC。
    pub fn order_by(&mut self, field: &str, direction: &str) -> &mut Self {
        match Direction::parse(direction) {
            Some(direction) => self.push_order(field, direction),
            None => {
                self.state.record_error(DatabaseError::malformed(format!(
                    "unknown sort direction `{direction}` for `{field}`"
                )));
                self
            }
        }
    }

    pub fn order_by_asc(&mut self, field: &str) -> &mut Self {
        self.push_order(field, Direction::Asc)
    }

    pub fn order_by_desc(&mut self, field: &str) -> &mut Self {
        self.push_order(field, Direction::Desc)
    }

    fn push_order(&mut self, field: &str, direction: Direction) -> &mut Self {
        self.state.order_by.push(OrderBy {
            field: field.trim().to_string(),
            direction,
            escape: true,
        });
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.state.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.state.offset = Some(offset);
        self
    }

    // ---- SET ----

    pub fn set(&mut self, column: &str, value: impl Into<Operand>) -> &mut Self {
        self.set_with(column, value, true)
    }

    /// `escape == false` 时值按原文拼接，如 `set_with("hits", "hits+1", false)`。
    pub fn set_with(&mut self, column: &str, value: impl Into<Operand>, escape: bool) -> &mut Self {
        self.state.put_set(SetValue {
            column: column.trim().to_string(),
            operand: value.into(),
            escape,
        });
        self
    }

    pub fn set_raw(&mut self, column: &str, expr: &str) -> &mut Self {
        self.set_with(column, Operand::raw(expr), false)
    }

    pub fn set_map<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        for (k, v) in pairs {
            self.set(k.as_ref(), v);
        }
        self
    }

    /// 下一次聚合调用经由缓存读取/写入结果。
    pub fn remember(&mut self, key: &str, ttl: Duration) -> &mut Self {
        self.remember = Some((key.to_string(), ttl));
        self
    }

    // ---- 终止调用 ----

    fn compile<F>(&self, kind: StatementKind, state: &QueryState, render: F) -> Result<String>
    where
        F: FnOnce(Escaper<'_>, &QueryState) -> Result<String>,
    {
        let esc = Escaper::new(self.conn.as_ref());
        let sql = render(esc, state).inspect_err(|e| {
            tracing::debug!(kind = %kind, error = %e, "query compilation failed");
        })?;
        tracing::debug!(
            kind = %kind,
            write = kind.is_write(),
            sql = %sql,
            test_mode = self.test_mode,
            "query compiled"
        );
        Ok(sql)
    }

    fn finish(&mut self) {
        if self.preserve {
            self.preserve = false;
            self.remember = None;
        } else {
            self.reset();
        }
    }

    /// 读语句：测试模式返回 SQL，否则执行并用 `map` 转换结果集。
    fn dispatch_read(
        &mut self,
        sql: String,
        map: impl FnOnce(ResultSet) -> ExecResult,
    ) -> Result<ExecResult> {
        if self.test_mode {
            self.finish();
            return Ok(ExecResult::Rendered(sql));
        }
        let rs = self.conn.query(&sql)?;
        self.finish();
        Ok(map(rs))
    }

    fn dispatch_write(&mut self, sql: String) -> Result<ExecResult> {
        if self.test_mode {
            self.finish();
            return Ok(ExecResult::Rendered(sql));
        }
        let ok = self.conn.simple_query(&sql)?;
        self.finish();
        Ok(ExecResult::Written(ok))
    }

    /// 渲染当前 SELECT 并重置状态（与模式无关）。
    pub fn sql(&mut self) -> Result<String> {
        let sql = self.compile(StatementKind::Select, &self.state, statement::select)?;
        self.finish();
        Ok(sql)
    }

    /// 渲染当前 SELECT，不修改状态。
    pub fn peek_sql(&self) -> Result<String> {
        self.compile(StatementKind::Select, &self.state, statement::select)
    }

    pub fn get(&mut self) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Select, &self.state, statement::select)?;
        self.dispatch_read(sql, ExecResult::Rows)
    }

    /// 同 [`QueryBuilder::get`]。
    pub fn all(&mut self) -> Result<ExecResult> {
        self.get()
    }

    /// 同 [`QueryBuilder::get`]。
    pub fn execute(&mut self) -> Result<ExecResult> {
        self.get()
    }

    fn compile_limited(&self) -> Result<String> {
        let mut state = self.state.clone();
        state.limit = Some(1);
        self.compile(StatementKind::Select, &state, statement::select)
    }

    /// 第一行（渲染时带 `LIMIT 1`）。
    pub fn first(&mut self) -> Result<ExecResult> {
        let sql = self.compile_limited()?;
        self.dispatch_read(sql, |rs| ExecResult::Row(rs.first()))
    }

    pub fn row(&mut self, index: usize) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Select, &self.state, statement::select)?;
        self.dispatch_read(sql, |rs| ExecResult::Row(rs.row(index)))
    }

    /// 第一行中 `column` 列的值；没有行时为 NULL。
    pub fn value(&mut self, column: &str) -> Result<ExecResult> {
        let sql = self.compile_limited()?;
        self.dispatch_read(sql, |rs| {
            let v = rs
                .first()
                .and_then(|r| r.get(column).cloned())
                .unwrap_or(SqlValue::Null);
            ExecResult::Scalar(v)
        })
    }

    pub fn values(&mut self, column: &str) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Select, &self.state, statement::select)?;
        self.dispatch_read(sql, |rs| ExecResult::Column(rs.column(column)))
    }

    /// `COUNT(*)`；有 GROUP BY 时改写为子查询计数。
    pub fn count(&mut self) -> Result<ExecResult> {
        self.count_field("*")
    }

    pub fn count_field(&mut self, field: &str) -> Result<ExecResult> {
        let seq = self.alias_seq + 1;
        let sql = self.compile(StatementKind::Count, &self.state, |esc, st| {
            statement::count(esc, st, field, seq)
        })?;
        self.alias_seq = seq;
        self.scalar(sql, SqlValue::U64(0), |v| {
            v.as_u64().map_or_else(|| v.clone(), SqlValue::U64)
        })
    }

    fn aggregate(&mut self, func: Aggregate, field: &str) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Aggregate, &self.state, |esc, st| {
            statement::aggregate(esc, st, func, field)
        })?;
        self.scalar(sql, SqlValue::Null, SqlValue::clone)
    }

    pub fn min(&mut self, field: &str) -> Result<ExecResult> {
        self.aggregate(Aggregate::Min, field)
    }

    pub fn max(&mut self, field: &str) -> Result<ExecResult> {
        self.aggregate(Aggregate::Max, field)
    }

    pub fn sum(&mut self, field: &str) -> Result<ExecResult> {
        self.aggregate(Aggregate::Sum, field)
    }

    pub fn avg(&mut self, field: &str) -> Result<ExecResult> {
        self.aggregate(Aggregate::Avg, field)
    }

    /// 单值查询：取第一行第一列，没有行时返回 `empty`；设置了 remember 时经过缓存。
    fn scalar(
        &mut self,
        sql: String,
        empty: SqlValue,
        normalize: impl Fn(&SqlValue) -> SqlValue,
    ) -> Result<ExecResult> {
        let cached = match (&self.remember, &self.cache) {
            (Some((key, ttl)), Some(cache)) => Some((cache_key(key, &sql), *ttl, cache.clone())),
            (Some((key, _)), None) => {
                tracing::warn!(key = %key, "remember() used without a cache; querying directly");
                None
            }
            _ => None,
        };

        // 测试模式下缓存的是 SQL 文本
        if self.test_mode {
            let sql = match &cached {
                Some((key, ttl, cache)) => match cache.get(key) {
                    Some(SqlValue::String(hit)) => {
                        tracing::debug!(key = %key, "rendered SQL served from cache");
                        hit.into_owned()
                    }
                    _ => {
                        cache.set(key, SqlValue::from(sql.clone()), *ttl);
                        sql
                    }
                },
                None => sql,
            };
            self.finish();
            return Ok(ExecResult::Rendered(sql));
        }

        if let Some((key, _, cache)) = &cached
            && let Some(v) = cache.get(key)
        {
            tracing::debug!(key = %key, "aggregate served from cache");
            self.finish();
            return Ok(ExecResult::Scalar(v));
        }

        let rs = self.conn.query(&sql)?;
        let value = rs
            .first()
            .and_then(|r| r.get_index(0).map(&normalize))
            .unwrap_or(empty);

        if let Some((key, ttl, cache)) = cached {
            cache.set(&key, value.clone(), ttl);
        }
        self.finish();
        Ok(ExecResult::Scalar(value))
    }

    // ---- 写语句 ----

    pub fn insert(&mut self) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Insert, &self.state, statement::insert)?;
        self.dispatch_write(sql)
    }

    /// 先合并 `data` 再 INSERT；失败时 `data` 不会留在状态里。
    pub fn insert_with<K, V>(&mut self, data: impl IntoIterator<Item = (K, V)>) -> Result<ExecResult>
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let state = self.state_with_set(data);
        let sql = self.compile(StatementKind::Insert, &state, statement::insert)?;
        self.dispatch_write(sql)
    }

    /// 一条多行 INSERT，列以第一行为准。
    pub fn insert_batch<R, K, V>(&mut self, rows: impl IntoIterator<Item = R>) -> Result<ExecResult>
    where
        R: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let rows: Vec<Vec<SetValue>> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(k, v)| SetValue {
                        column: k.as_ref().trim().to_string(),
                        operand: v.into(),
                        escape: true,
                    })
                    .collect()
            })
            .collect();
        let sql = self.compile(StatementKind::Insert, &self.state, |esc, st| {
            statement::insert_batch(esc, st, &rows)
        })?;
        self.dispatch_write(sql)
    }

    pub fn replace(&mut self) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Replace, &self.state, statement::replace)?;
        self.dispatch_write(sql)
    }

    pub fn update(&mut self) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Update, &self.state, statement::update)?;
        self.dispatch_write(sql)
    }

    pub fn update_with<K, V>(&mut self, data: impl IntoIterator<Item = (K, V)>) -> Result<ExecResult>
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let state = self.state_with_set(data);
        let sql = self.compile(StatementKind::Update, &state, statement::update)?;
        self.dispatch_write(sql)
    }

    /// DELETE；目标表总是去掉别名。
    pub fn delete(&mut self) -> Result<ExecResult> {
        let sql = self.compile(StatementKind::Delete, &self.state, statement::delete)?;
        self.dispatch_write(sql)
    }

    /// 把 `conditions` 以 AND 合并进已有 WHERE 后 DELETE。
    pub fn delete_where<K, V>(
        &mut self,
        conditions: impl IntoIterator<Item = (K, V)>,
    ) -> Result<ExecResult>
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let mut state = self.state.clone();
        for (k, v) in conditions {
            let cond = Condition::parse(k.as_ref(), v.into(), true);
            if let Err(e) = Self::push_condition(&mut state.wheres, Connector::And, cond) {
                state.record_error(e);
            }
        }
        let sql = self.compile(StatementKind::Delete, &state, statement::delete)?;
        self.dispatch_write(sql)
    }

    fn state_with_set<K, V>(&self, data: impl IntoIterator<Item = (K, V)>) -> QueryState
    where
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let mut state = self.state.clone();
        for (k, v) in data {
            state.put_set(SetValue {
                column: k.as_ref().trim().to_string(),
                operand: v.into(),
                escape: true,
            });
        }
        state
    }
}
