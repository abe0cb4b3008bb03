//! 构建器错误类型。

use crate::connection::ConnectionError;
use crate::literal::EscapeError;

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// 构建与执行查询时可能出现的错误。
///
/// 前置条件错误（缺表、缺 SET 数据、子句格式错误）在渲染前同步返回；
/// 连接层错误原样包在 [`DatabaseError::Execution`] 中。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatabaseError {
    #[error("Table is not defined.")]
    TableNotDefined,
    #[error("malformed clause: {0}")]
    MalformedClause(String),
    #[error("You must use the \"set\" method to update an entry.")]
    EmptySet,
    #[error(transparent)]
    Escape(#[from] EscapeError),
    #[error(transparent)]
    Execution(#[from] ConnectionError),
}

impl DatabaseError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedClause(msg.into())
    }

    /// 是否为构建阶段（而非执行阶段）的错误。
    pub fn is_builder_error(&self) -> bool {
        !matches!(self, Self::Execution(_))
    }
}
