//! Escaper：决定一个 token 是原样 SQL 片段还是需要加引号的标识符，并附加表前缀。

use crate::connection::Connection;
use crate::error::Result;
use crate::flavor::Flavor;
use crate::value::SqlValue;

const EXPR_CHARS: &[char] = &['(', ')', '=', '<', '>', '!', '+', '-', '/', '%', '|', '&', '\'', '"', '`', ',', ' ', '\t', '\n'];

const KEYWORDS: &[&str] = &[
    "AND", "OR", "NOT", "NULL", "IS", "IN", "LIKE", "BETWEEN", "TRUE", "FALSE", "AS", "ON",
];

/// 判断 token 是否为表达式（函数调用、运算、多个单词等），表达式永远不会被加引号。
pub fn is_expression(token: &str) -> bool {
    let t = token.trim();
    t.is_empty() || t.contains(EXPR_CHARS) || t.parse::<f64>().is_ok()
}

/// 判断 token 是否为 `name` / `table.column` 形式的标识符。
fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    token
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '.' || c == '*')
        && !KEYWORDS.contains(&token.to_ascii_uppercase().as_str())
}

/// 绑定到某个连接的转义器，生命周期只覆盖一次渲染。
#[derive(Clone, Copy)]
pub(crate) struct Escaper<'a> {
    conn: &'a dyn Connection,
    flavor: Flavor,
    prefix: &'a str,
    protect: bool,
}

impl<'a> Escaper<'a> {
    pub(crate) fn new(conn: &'a dyn Connection) -> Self {
        let config = conn.config();
        Self {
            conn,
            flavor: config.flavor,
            prefix: &config.prefix,
            protect: config.protect_identifiers,
        }
    }

    pub(crate) fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub(crate) fn prefix(&self) -> &str {
        self.prefix
    }

    /// 为标识符加引号；`escape == false`、未开启引号或 token 为表达式时原样返回。
    pub(crate) fn identifier(&self, token: &str, escape: bool) -> String {
        if !escape || !self.protect || is_expression(token) || !is_identifier(token) {
            return token.to_string();
        }
        token
            .split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    self.flavor.quote(part)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// 物理表名：加前缀后再加引号。
    pub(crate) fn table(&self, name: &str, escape: bool) -> String {
        let prefixed = if self.prefix.is_empty() || name.starts_with(self.prefix) {
            name.to_string()
        } else {
            format!("{}{}", self.prefix, name)
        };
        self.identifier(&prefixed, escape)
    }

    /// 对 `a.id = b.a_id` 之类的表达式逐个 token 加引号，其余部分原样保留。
    pub(crate) fn expression(&self, expr: &str, escape: bool) -> String {
        if !escape || !self.protect {
            return expr.to_string();
        }
        expr.split(' ')
            .map(|tok| {
                if is_identifier(tok) {
                    self.identifier(tok, true)
                } else {
                    tok.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// 值：`escape` 时交给连接转义，否则按原文拼接。
    pub(crate) fn value(&self, value: &SqlValue, escape: bool) -> Result<String> {
        if !escape {
            return Ok(value.to_raw_text());
        }
        Ok(self.conn.escape(value)?)
    }
}
