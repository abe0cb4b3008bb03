//! 字面量编码：把 [`SqlValue`] 按方言渲染成可直接拼入 SQL 的文本。
//!
//! 这是 `Connection::escape` 的默认实现。字符串一律转义引号，调用方不需要再处理。

use crate::flavor::Flavor;
use crate::value::SqlValue;
use crate::valuer::ValuerError;
use time::macros::format_description;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscapeError {
    #[error("value cannot be rendered as a {0} literal")]
    UnsupportedValue(Flavor),
    #[error("timestamp formatting failed: {0}")]
    Format(String),
    #[error(transparent)]
    Valuer(#[from] ValuerError),
}

/// 把一个值编码为 `flavor` 下的 SQL 字面量。
pub fn encode_literal(value: &SqlValue, flavor: Flavor) -> Result<String, EscapeError> {
    let mut out = String::new();
    match value {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Bool(b) => match flavor {
            Flavor::SQLServer | Flavor::Oracle => out.push(if *b { '1' } else { '0' }),
            _ => out.push_str(if *b { "TRUE" } else { "FALSE" }),
        },
        SqlValue::I64(n) => out.push_str(&n.to_string()),
        SqlValue::U64(n) => out.push_str(&n.to_string()),
        SqlValue::F64(n) => {
            if !n.is_finite() {
                return Err(EscapeError::UnsupportedValue(flavor));
            }
            out.push_str(&n.to_string());
        }
        SqlValue::String(s) => quote_string(&mut out, s, flavor),
        SqlValue::Bytes(b) => encode_bytes(&mut out, b, flavor),
        SqlValue::DateTime(dt) => encode_datetime(&mut out, dt, flavor)?,
    }
    Ok(out)
}

fn quote_string(out: &mut String, s: &str, flavor: Flavor) {
    match flavor {
        // MySQL 与 PostgreSQL 的 E'' 字符串都支持反斜杠转义
        Flavor::MySQL | Flavor::PostgreSQL => {
            if flavor == Flavor::PostgreSQL {
                out.push('E');
            }
            out.push('\'');
            for ch in s.chars() {
                match ch {
                    '\u{0000}' => out.push_str("\\0"),
                    '\u{0008}' => out.push_str("\\b"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    '\u{001a}' => out.push_str("\\Z"),
                    '\'' => out.push_str("\\'"),
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    _ => out.push(ch),
                }
            }
            out.push('\'');
        }
        Flavor::SQLite | Flavor::SQLServer | Flavor::Oracle => {
            if flavor == Flavor::SQLServer {
                out.push('N');
            }
            out.push('\'');
            out.push_str(&s.replace('\'', "''"));
            out.push('\'');
        }
    }
}

fn encode_bytes(out: &mut String, data: &[u8], flavor: Flavor) {
    if data.is_empty() {
        out.push_str("NULL");
        return;
    }

    match flavor {
        Flavor::MySQL | Flavor::SQLite => {
            out.push_str("X'");
            push_hex(out, data);
            out.push('\'');
        }
        Flavor::PostgreSQL => {
            out.push_str("'\\x");
            push_hex(out, data);
            out.push_str("'::bytea");
        }
        Flavor::SQLServer => {
            out.push_str("0x");
            push_hex(out, data);
        }
        Flavor::Oracle => {
            out.push_str("hextoraw('");
            push_hex(out, data);
            out.push_str("')");
        }
    }
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in data {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}

fn encode_datetime(
    out: &mut String,
    dt: &time::OffsetDateTime,
    flavor: Flavor,
) -> Result<(), EscapeError> {
    let formatted = match flavor {
        Flavor::MySQL => dt.format(format_description!(
            "'[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]'"
        )),
        Flavor::SQLite => dt.format(format_description!(
            "'[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]'"
        )),
        Flavor::PostgreSQL | Flavor::SQLServer => dt.format(format_description!(
            "'[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6] [offset_hour sign:mandatory]:[offset_minute]'"
        )),
        Flavor::Oracle => dt
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
            ))
            .map(|s| format!("to_timestamp('{s}', 'YYYY-MM-DD HH24:MI:SS.FF')")),
    };
    out.push_str(&formatted.map_err(|e| EscapeError::Format(e.to_string()))?);
    Ok(())
}
