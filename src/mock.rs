//! MockConnection：不连数据库的连接实现，记录执行过的 SQL 并返回预置结果。

use crate::connection::{Connection, ConnectionConfig, ConnectionError};
use crate::result::ResultSet;
use std::cell::RefCell;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct MockConnection {
    config: ConnectionConfig,
    executed: RefCell<Vec<String>>,
    results: RefCell<VecDeque<Result<ResultSet, ConnectionError>>>,
    write_results: RefCell<VecDeque<Result<bool, ConnectionError>>>,
}

impl MockConnection {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// 下一次 `query` 返回的结果集。
    pub fn push_result(&self, rs: ResultSet) {
        self.results.borrow_mut().push_back(Ok(rs));
    }

    pub fn push_error(&self, err: ConnectionError) {
        self.results.borrow_mut().push_back(Err(err));
    }

    /// 下一次 `simple_query` 的返回值；未预置时返回 `Ok(true)`。
    pub fn push_write(&self, result: Result<bool, ConnectionError>) {
        self.write_results.borrow_mut().push_back(result);
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.executed.borrow().last().cloned()
    }
}

impl Connection for MockConnection {
    fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn query(&self, sql: &str) -> Result<ResultSet, ConnectionError> {
        self.executed.borrow_mut().push(sql.to_string());
        self.results
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(ResultSet::default()))
    }

    fn simple_query(&self, sql: &str) -> Result<bool, ConnectionError> {
        self.executed.borrow_mut().push(sql.to_string());
        self.write_results.borrow_mut().pop_front().unwrap_or(Ok(true))
    }
}
