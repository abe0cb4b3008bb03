//! Connection：构建器依赖的数据库连接边界。
//!
//! 构建器只从连接上读取转义规则、表前缀与方言，并在非测试模式下把 SQL 交给它执行。
//! 驱动、连接池与网络协议都在这个 trait 之外。

use crate::flavor::{Flavor, default_flavor};
use crate::literal::{EscapeError, encode_literal};
use crate::result::ResultSet;
use crate::value::SqlValue;

/// 连接执行 SQL 失败时返回的错误，构建器不做任何解释直接向上传递。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConnectionError {
    pub message: String,
    pub code: Option<i32>,
}

impl ConnectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

/// 连接配置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub database: String,
    /// 物理表名前缀，如 `db_`；不会作用于别名和列名。
    /// 以未起别名的表名作限定符时（`jobs.id`），限定符同样加前缀。
    pub prefix: String,
    pub flavor: Flavor,
    /// 为 true 时按 flavor 为标识符加引号。
    pub protect_identifiers: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            prefix: String::new(),
            flavor: default_flavor(),
            protect_identifiers: false,
        }
    }
}

impl ConnectionConfig {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_protect_identifiers(mut self, on: bool) -> Self {
        self.protect_identifiers = on;
        self
    }
}

/// 构建器使用的连接接口。
pub trait Connection {
    fn config(&self) -> &ConnectionConfig;

    /// 执行读语句并返回结果集。
    fn query(&self, sql: &str) -> Result<ResultSet, ConnectionError>;

    /// 执行写语句，返回驱动报告的成功与否。
    fn simple_query(&self, sql: &str) -> Result<bool, ConnectionError>;

    /// 把值渲染为字面量；默认按 flavor 编码。
    fn escape(&self, value: &SqlValue) -> Result<String, EscapeError> {
        encode_literal(value, self.config().flavor)
    }

    fn database(&self) -> &str {
        &self.config().database
    }

    fn prefix(&self) -> &str {
        &self.config().prefix
    }

    fn flavor(&self) -> Flavor {
        self.config().flavor
    }
}
