//! SqlValuer：渲染阶段才计算出实际值的自定义类型。

use crate::value::SqlValue;

/// 自定义值无法转换时返回的错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("query builder valuer error: {0}")]
pub struct ValuerError(pub String);

/// 在生成 SQL 时才产出 [`SqlValue`] 的值，例如枚举、业务 ID 等。
pub trait SqlValuer: dyn_clone::DynClone + std::fmt::Debug {
    fn value(&self) -> Result<SqlValue, ValuerError>;
}

dyn_clone::clone_trait_object!(SqlValuer);
