//! TableRef：FROM/JOIN 的表引用（物理表或子查询）及别名解析。

use crate::error::{DatabaseError, Result};
use crate::state::QueryState;

#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Name(String),
    Subquery(Box<QueryState>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub source: TableSource,
    pub alias: Option<String>,
}

impl TableRef {
    /// 解析 `jobs`、`jobs j`、`jobs As j`（`AS`/`as` 均可）。
    pub fn parse(input: &str) -> Result<Self> {
        if input.contains(',') {
            return Err(DatabaseError::malformed(format!(
                "only one table can be used in FROM, got `{input}`"
            )));
        }
        let words: Vec<&str> = input.split_whitespace().collect();
        let (name, alias) = match words.as_slice() {
            [name] => (*name, None),
            [name, alias] => (*name, Some(*alias)),
            [name, kw, alias] if kw.eq_ignore_ascii_case("as") => (*name, Some(*alias)),
            _ => {
                return Err(DatabaseError::malformed(format!(
                    "cannot parse table reference `{input}`"
                )));
            }
        };
        Ok(Self {
            source: TableSource::Name(name.to_string()),
            alias: alias.map(str::to_string),
        })
    }

    pub fn subquery(state: QueryState, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::Subquery(Box::new(state)),
            alias: Some(alias.into()),
        }
    }

    /// 物理表名；子查询返回 `None`。
    pub fn name(&self) -> Option<&str> {
        match &self.source {
            TableSource::Name(n) => Some(n),
            TableSource::Subquery(_) => None,
        }
    }
}

/// 生成 `<table>_<hash>` 形式的别名：对同样的输入稳定，`seq` 不同则不同。
pub(crate) fn generated_alias(table: &str, signature: &str, seq: u64) -> String {
    // FNV-1a 64
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let seq_bytes = seq.to_le_bytes();
    for b in table
        .bytes()
        .chain([0u8])
        .chain(signature.bytes())
        .chain(seq_bytes)
    {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{table}_{:08x}", hash as u32 ^ (hash >> 32) as u32)
}
