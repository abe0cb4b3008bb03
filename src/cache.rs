//! 聚合结果缓存：构建器只负责拼 key，读写语义交给实现方。

use crate::value::SqlValue;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// 聚合函数使用的缓存接口。
pub trait QueryCache {
    fn get(&self, key: &str) -> Option<SqlValue>;
    fn set(&self, key: &str, value: SqlValue, ttl: Duration);
}

/// 进程内缓存，按 TTL 过期；与 builder 一样只在单线程内使用。
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, (SqlValue, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl QueryCache for MemoryCache {
    fn get(&self, key: &str) -> Option<SqlValue> {
        let mut entries = self.entries.borrow_mut();
        match entries.get(key) {
            Some((value, expires)) if *expires > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn set(&self, key: &str, value: SqlValue, ttl: Duration) {
        let expires = Instant::now() + ttl;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), (value, expires));
    }
}

/// 缓存 key：调用方给出的 key 加上查询形状（SQL 文本）的哈希。
pub(crate) fn cache_key(key: &str, sql: &str) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in sql.bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!("{key}:{hash:016x}")
}
