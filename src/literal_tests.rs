#[cfg(test)]
mod tests {
    use crate::{EscapeError, Flavor, SqlValue, encode_literal};
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    fn enc(v: impl Into<SqlValue>, flavor: Flavor) -> String {
        encode_literal(&v.into(), flavor).unwrap()
    }

    #[test]
    fn strings_per_flavor() {
        let s = "it's a \\ test";
        let cases = vec![
            (Flavor::MySQL, "'it\\'s a \\\\ test'"),
            (Flavor::PostgreSQL, "E'it\\'s a \\\\ test'"),
            (Flavor::SQLite, "'it''s a \\ test'"),
            (Flavor::SQLServer, "N'it''s a \\ test'"),
            (Flavor::Oracle, "'it''s a \\ test'"),
        ];
        for (flavor, expected) in cases {
            assert_eq!(enc(s, flavor), expected, "{flavor}");
        }
        assert_eq!(enc("a\nb", Flavor::MySQL), "'a\\nb'");
    }

    #[test]
    fn scalars() {
        assert_eq!(enc((), Flavor::MySQL), "NULL");
        assert_eq!(enc(-7_i64, Flavor::MySQL), "-7");
        assert_eq!(enc(u64::MAX, Flavor::MySQL), "18446744073709551615");
        assert_eq!(enc(1.5_f64, Flavor::MySQL), "1.5");
        assert_eq!(enc(true, Flavor::PostgreSQL), "TRUE");
        assert_eq!(enc(false, Flavor::SQLServer), "0");
        assert_eq!(enc(true, Flavor::Oracle), "1");
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert_eq!(
            encode_literal(&SqlValue::F64(f64::INFINITY), Flavor::SQLite),
            Err(EscapeError::UnsupportedValue(Flavor::SQLite))
        );
    }

    #[test]
    fn bytes_per_flavor() {
        let data = vec![0xDE_u8, 0xAD, 0x01];
        let cases = vec![
            (Flavor::MySQL, "X'DEAD01'"),
            (Flavor::SQLite, "X'DEAD01'"),
            (Flavor::PostgreSQL, "'\\xDEAD01'::bytea"),
            (Flavor::SQLServer, "0xDEAD01"),
            (Flavor::Oracle, "hextoraw('DEAD01')"),
        ];
        for (flavor, expected) in cases {
            assert_eq!(enc(data.clone(), flavor), expected, "{flavor}");
        }
        assert_eq!(enc(Vec::<u8>::new(), Flavor::MySQL), "NULL");
    }

    #[test]
    fn timestamps_per_flavor() {
        let ts = datetime!(2024-01-02 03:04:05.123456 UTC);
        let cases = vec![
            (Flavor::MySQL, "'2024-01-02 03:04:05.123456'"),
            (Flavor::SQLite, "'2024-01-02 03:04:05.123'"),
            (Flavor::PostgreSQL, "'2024-01-02 03:04:05.123456 +00:00'"),
            (Flavor::SQLServer, "'2024-01-02 03:04:05.123456 +00:00'"),
            (
                Flavor::Oracle,
                "to_timestamp('2024-01-02 03:04:05.123456', 'YYYY-MM-DD HH24:MI:SS.FF')",
            ),
        ];
        for (flavor, expected) in cases {
            assert_eq!(enc(ts, flavor), expected, "{flavor}");
        }
    }
}
