//! 查询结果：连接返回的行集合，以及终止调用的统一返回类型。

use crate::value::SqlValue;
use std::rc::Rc;

/// 结果集中的一行，列名与结果集共享。
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Rc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// 按列名取值。
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.values.get(idx)
    }

    pub fn get_index(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// 驱动行数据的包装。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    columns: Rc<[String]>,
    rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(Into::into)
                .collect::<Vec<String>>()
                .into(),
            rows: Vec::new(),
        }
    }

    /// 追加一行；列数不足时补 NULL，多余的值被丢弃。
    pub fn push_row(&mut self, values: impl IntoIterator<Item = impl Into<SqlValue>>) {
        let mut row: Vec<SqlValue> = values.into_iter().map(Into::into).collect();
        row.resize(self.columns.len(), SqlValue::Null);
        self.rows.push(row);
    }

    pub fn with_row(mut self, values: impl IntoIterator<Item = impl Into<SqlValue>>) -> Self {
        self.push_row(values);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn make_row(&self, values: &[SqlValue]) -> Row {
        Row {
            columns: self.columns.clone(),
            values: values.to_vec(),
        }
    }

    /// 全部行。
    pub fn result(&self) -> Vec<Row> {
        self.rows.iter().map(|r| self.make_row(r)).collect()
    }

    pub fn row(&self, index: usize) -> Option<Row> {
        self.rows.get(index).map(|r| self.make_row(r))
    }

    pub fn first(&self) -> Option<Row> {
        self.row(0)
    }

    pub fn last(&self) -> Option<Row> {
        self.rows.last().map(|r| self.make_row(r))
    }

    /// 某一列的全部值；列不存在时返回空。
    pub fn column(&self, column: &str) -> Vec<SqlValue> {
        let Some(idx) = self.columns.iter().position(|c| c == column) else {
            return Vec::new();
        };
        self.rows.iter().map(|r| r[idx].clone()).collect()
    }
}

/// 终止调用的结果。测试模式下总是 `Rendered`。
#[derive(Debug, Clone, PartialEq)]
pub enum ExecResult {
    Rendered(String),
    Written(bool),
    Rows(ResultSet),
    Row(Option<Row>),
    Scalar(SqlValue),
    Column(Vec<SqlValue>),
}

impl ExecResult {
    /// 测试模式下渲染出的 SQL。
    pub fn sql(&self) -> Option<&str> {
        match self {
            Self::Rendered(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_sql(self) -> Option<String> {
        match self {
            Self::Rendered(s) => Some(s),
            _ => None,
        }
    }

    pub fn written(&self) -> Option<bool> {
        match self {
            Self::Written(b) => Some(*b),
            _ => None,
        }
    }

    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            Self::Rows(rs) => Some(rs),
            _ => None,
        }
    }

    pub fn into_row(self) -> Option<Row> {
        match self {
            Self::Row(r) => r,
            _ => None,
        }
    }

    pub fn into_scalar(self) -> Option<SqlValue> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_column(self) -> Option<Vec<SqlValue>> {
        match self {
            Self::Column(v) => Some(v),
            _ => None,
        }
    }
}
