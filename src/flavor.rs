//! SQL Flavor（方言）：控制标识符引号、INSERT IGNORE、LIMIT/OFFSET 位置等行为。

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard};

/// 构建器支持的方言。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    #[default]
    MySQL,
    PostgreSQL,
    SQLite,
    SQLServer,
    Oracle,
}

static DEFAULT_FLAVOR: AtomicU8 = AtomicU8::new(Flavor::MySQL as u8);
static DEFAULT_FLAVOR_LOCK: Mutex<()> = Mutex::new(());

impl Flavor {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::PostgreSQL,
            2 => Self::SQLite,
            3 => Self::SQLServer,
            4 => Self::Oracle,
            _ => Self::MySQL,
        }
    }
}

/// 获取当前全局默认 Flavor。新建的 `ConnectionConfig` 会读取它。
pub fn default_flavor() -> Flavor {
    Flavor::from_u8(DEFAULT_FLAVOR.load(Ordering::Relaxed))
}

/// 设置全局默认 Flavor，返回旧值。
pub fn set_default_flavor(flavor: Flavor) -> Flavor {
    let old = DEFAULT_FLAVOR.swap(flavor as u8, Ordering::Relaxed);
    Flavor::from_u8(old)
}

/// 修改全局默认 Flavor 的 RAII guard（持有全局锁，避免并行测试互相干扰）。
pub struct DefaultFlavorGuard {
    _lock: MutexGuard<'static, ()>,
    old: Flavor,
}

impl Drop for DefaultFlavorGuard {
    fn drop(&mut self) {
        set_default_flavor(self.old);
    }
}

/// 在一个作用域内临时设置 DefaultFlavor，退出作用域后自动恢复。
pub fn set_default_flavor_scoped(flavor: Flavor) -> DefaultFlavorGuard {
    let lock = DEFAULT_FLAVOR_LOCK
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    let old = set_default_flavor(flavor);
    DefaultFlavorGuard { _lock: lock, old }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
            Self::SQLServer => "SQLServer",
            Self::Oracle => "Oracle",
        };
        f.write_str(s)
    }
}

impl Flavor {
    /// 为单个标识符加引号（不拆分 `.`，由 escape 模块负责）。
    pub fn quote(self, name: &str) -> String {
        match self {
            Self::MySQL => format!("`{name}`"),
            Self::SQLServer => format!("[{name}]"),
            Self::PostgreSQL | Self::SQLite | Self::Oracle => format!("\"{name}\""),
        }
    }

    /// INSERT IGNORE 的动词写法；PostgreSQL 另需在末尾追加 `ON CONFLICT DO NOTHING`。
    pub fn prepare_insert_ignore(self) -> &'static str {
        match self {
            Flavor::MySQL | Flavor::Oracle => "INSERT IGNORE",
            Flavor::SQLite => "INSERT OR IGNORE",
            Flavor::PostgreSQL | Flavor::SQLServer => "INSERT",
        }
    }

    /// 追加在 INSERT 语句末尾的 IGNORE 后缀。
    pub fn insert_ignore_suffix(self) -> Option<&'static str> {
        match self {
            Flavor::PostgreSQL => Some("ON CONFLICT DO NOTHING"),
            _ => None,
        }
    }

    /// `ORDER BY ... RANDOM` 使用的随机函数。
    pub fn random_function(self) -> &'static str {
        match self {
            Flavor::MySQL => "RAND()",
            Flavor::PostgreSQL | Flavor::SQLite => "RANDOM()",
            Flavor::SQLServer => "NEWID()",
            Flavor::Oracle => "DBMS_RANDOM.VALUE",
        }
    }

    /// 是否使用 `OFFSET n ROWS FETCH NEXT m ROWS ONLY` 形式分页。
    pub fn uses_fetch_next(self) -> bool {
        matches!(self, Flavor::SQLServer | Flavor::Oracle)
    }
}
