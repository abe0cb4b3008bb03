#[cfg(test)]
mod tests {
    use crate::{
        Connection, ConnectionConfig, ConnectionError, DatabaseError, ExecResult, Flavor,
        LikeSide, MemoryCache, MockConnection, QueryBuilder, ResultSet, SqlValue,
    };
    use pretty_assertions::assert_eq;
    use std::rc::Rc;
    use std::time::Duration;

    fn conn_with(config: ConnectionConfig) -> Rc<MockConnection> {
        Rc::new(MockConnection::new(config))
    }

    fn mysql(prefix: &str) -> Rc<MockConnection> {
        conn_with(
            ConnectionConfig::new("test")
                .with_prefix(prefix)
                .with_flavor(Flavor::MySQL),
        )
    }

    fn test_builder(conn: &Rc<MockConnection>, table: &str) -> QueryBuilder {
        let mut qb = QueryBuilder::table(conn.clone(), table);
        qb.test_mode(true);
        qb
    }

    fn rendered(result: crate::Result<ExecResult>) -> String {
        result
            .expect("terminal call failed")
            .into_sql()
            .expect("not rendered in test mode")
    }

    #[test]
    fn db_returns_the_bound_connection() {
        let conn: Rc<dyn Connection> = mysql("");
        let qb = QueryBuilder::new(conn.clone());
        assert!(Rc::ptr_eq(qb.db(), &conn));
        assert_eq!(qb.db().database(), "test");
    }

    #[test]
    fn distinct_select_with_alias() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "users u");
        qb.select("country").distinct();
        assert_eq!(rendered(qb.get()), "SELECT DISTINCT country FROM users As u");
    }

    #[test]
    fn select_splits_comma_lists_but_not_expressions() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.select("id, name").select("CONCAT(first, ', ', last) As full_name");
        assert_eq!(
            rendered(qb.get()),
            "SELECT id, name, CONCAT(first, ', ', last) As full_name FROM jobs"
        );
    }

    #[test]
    fn sql_renders_and_resets() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_("id >", 3);
        assert_eq!(qb.sql().unwrap(), "SELECT * FROM jobs WHERE id > 3");
        assert!(qb.state().is_empty());
        assert_eq!(qb.sql(), Err(DatabaseError::TableNotDefined));
    }

    #[test]
    fn peek_sql_leaves_state_untouched() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs j");
        qb.where_("id >", 3).order_by_desc("id");
        let before = qb.state().clone();
        let first = qb.peek_sql().unwrap();
        let second = qb.peek_sql().unwrap();
        assert_eq!(first, second);
        assert_eq!(qb.state(), &before);
        assert_eq!(rendered(qb.get()), first);
    }

    #[test]
    fn builder_is_reusable_after_terminal_call() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_("id", 1);
        assert_eq!(rendered(qb.get()), "SELECT * FROM jobs WHERE id = 1");

        qb.from("users").where_("name", "bob");
        assert_eq!(rendered(qb.get()), "SELECT * FROM users WHERE name = 'bob'");
    }

    #[test]
    fn deferred_parse_error_keeps_state() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_("id", 1).from("jobs, users");
        let err = qb.get().unwrap_err();
        assert!(matches!(err, DatabaseError::MalformedClause(_)));
        assert!(err.is_builder_error());
        assert_eq!(qb.state().wheres.len(), 1);

        qb.reset();
        assert!(qb.state().is_empty());
    }

    #[test]
    fn missing_table_is_reported() {
        let conn = mysql("");
        let mut qb = QueryBuilder::new(conn.clone());
        qb.test_mode(true).where_("id", 1);
        assert_eq!(qb.get(), Err(DatabaseError::TableNotDefined));
        assert!(!qb.state().is_empty());
    }

    #[test]
    fn where_null_and_operators() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_("deleted_at", ())
            .where_("archived_at !=", Option::<i64>::None)
            .where_("salary >=", 1000)
            .where_("title <>", "intern");
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM jobs WHERE deleted_at IS NULL AND archived_at IS NOT NULL AND salary >= 1000 AND title != 'intern'"
        );
    }

    #[test]
    fn or_where_and_raw_conditions() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_("status", "open")
            .or_where("priority >", 5)
            .where_raw("created_at > NOW() - INTERVAL 1 DAY");
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM jobs WHERE status = 'open' OR priority > 5 AND created_at > NOW() - INTERVAL 1 DAY"
        );
    }

    #[test]
    fn grouped_conditions() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_("a", 1)
            .group_start()
            .where_("b", 2)
            .or_where("c", 3)
            .group_end()
            .or_not_group_start()
            .where_("d", 4)
            .group_end();
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM jobs WHERE a = 1 AND (b = 2 OR c = 3) OR NOT (d = 4)"
        );
    }

    #[test]
    fn unbalanced_groups_are_rejected() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.group_start().where_("a", 1);
        assert!(matches!(qb.get(), Err(DatabaseError::MalformedClause(_))));

        qb.reset();
        qb.from("jobs").where_("a", 1).group_end();
        assert!(matches!(qb.get(), Err(DatabaseError::MalformedClause(_))));
    }

    #[test]
    fn where_in_lists() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_in("id", [1, 2, 3])
            .or_where_not_in("status", ["closed", "draft"]);
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM jobs WHERE id IN (1, 2, 3) OR status NOT IN ('closed', 'draft')"
        );

        qb.from("jobs").where_in("id", Vec::<i64>::new());
        assert!(matches!(qb.get(), Err(DatabaseError::MalformedClause(_))));
    }

    #[test]
    fn like_variants() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.like("title", "rust", LikeSide::Both)
            .or_like("title", "go", LikeSide::After)
            .not_like("title", "php", LikeSide::Before)
            .or_not_like("code", "X1", LikeSide::None);
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM jobs WHERE title LIKE '%rust%' OR title LIKE 'go%' AND title NOT LIKE '%php' OR code NOT LIKE 'X1'"
        );
    }

    #[test]
    fn string_values_are_escaped() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "authors");
        qb.where_("name", "O'Reilly");
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM authors WHERE name = 'O\\'Reilly'"
        );
    }

    #[test]
    fn unescaped_values_are_inlined_verbatim() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_with("created_at <", "NOW()", false);
        assert_eq!(rendered(qb.get()), "SELECT * FROM jobs WHERE created_at < NOW()");
    }

    #[test]
    fn joins_with_prefix() {
        let conn = mysql("db_");
        let mut qb = test_builder(&conn, "jobs j");
        qb.select("j.id, u.name")
            .left_join("users u", "u.id = j.user_id")
            .join("tags", "tags.job_id = j.id");
        assert_eq!(
            rendered(qb.get()),
            "SELECT j.id, u.name FROM db_jobs As j LEFT JOIN db_users As u ON u.id = j.user_id JOIN db_tags ON db_tags.job_id = j.id"
        );
    }

    #[test]
    fn group_by_having_order_limit() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.select("country")
            .select_count("id", Some("total"))
            .group_by("country")
            .having("total >", 10)
            .or_having_raw("country = 'NZ'")
            .order_by("total", "desc")
            .order_by_asc("country")
            .limit(10)
            .offset(20);
        assert_eq!(
            rendered(qb.get()),
            "SELECT country, COUNT(id) As total FROM jobs GROUP BY country HAVING total > 10 OR country = 'NZ' ORDER BY total DESC, country ASC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn order_by_random_and_unknown_direction() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.order_by("id", "RANDOM");
        assert_eq!(rendered(qb.get()), "SELECT * FROM jobs ORDER BY RAND()");

        qb.from("jobs").order_by("id", "sideways");
        assert!(matches!(qb.get(), Err(DatabaseError::MalformedClause(_))));
    }

    #[test]
    fn limit_offset_per_flavor() {
        let cases = vec![
            (Flavor::MySQL, None, Some(5), "SELECT * FROM jobs LIMIT 18446744073709551615 OFFSET 5"),
            (Flavor::SQLite, None, Some(5), "SELECT * FROM jobs LIMIT -1 OFFSET 5"),
            (Flavor::PostgreSQL, None, Some(5), "SELECT * FROM jobs OFFSET 5"),
            (Flavor::PostgreSQL, Some(10), Some(5), "SELECT * FROM jobs LIMIT 10 OFFSET 5"),
            (
                Flavor::SQLServer,
                Some(10),
                None,
                "SELECT * FROM jobs ORDER BY 1 OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY",
            ),
            (
                Flavor::Oracle,
                Some(10),
                Some(20),
                "SELECT * FROM jobs OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY",
            ),
        ];

        for (flavor, limit, offset, expected) in cases {
            let conn = conn_with(ConnectionConfig::new("test").with_flavor(flavor));
            let mut qb = test_builder(&conn, "jobs");
            if let Some(l) = limit {
                qb.limit(l);
            }
            if let Some(o) = offset {
                qb.offset(o);
            }
            assert_eq!(rendered(qb.get()), expected, "{flavor}");
        }
    }

    #[test]
    fn protect_identifiers_quotes_per_flavor() {
        let conn = conn_with(
            ConnectionConfig::new("test")
                .with_flavor(Flavor::MySQL)
                .with_protect_identifiers(true),
        );
        let mut qb = test_builder(&conn, "jobs j");
        qb.select(["j.id", "j.*"])
            .select("COUNT(*) As n")
            .where_("j.status", "open");
        assert_eq!(
            rendered(qb.get()),
            "SELECT `j`.`id`, `j`.*, COUNT(*) As n FROM `jobs` As `j` WHERE `j`.`status` = 'open'"
        );

        let conn = conn_with(
            ConnectionConfig::new("test")
                .with_flavor(Flavor::PostgreSQL)
                .with_protect_identifiers(true),
        );
        let mut qb = test_builder(&conn, "jobs");
        qb.select("id");
        assert_eq!(rendered(qb.get()), "SELECT \"id\" FROM \"jobs\"");
    }

    #[test]
    fn select_aggregate_projections() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.select_max("salary", None)
            .select_min("j.salary", Some("lowest"))
            .select_avg("salary", Some("mean"))
            .select_sum("bonus", None);
        assert_eq!(
            rendered(qb.get()),
            "SELECT MAX(salary) As salary, MIN(j.salary) As lowest, AVG(salary) As mean, SUM(bonus) As bonus FROM jobs"
        );
    }

    #[test]
    fn from_subquery_renders_nested_select() {
        let conn = mysql("");
        let mut sub = test_builder(&conn, "jobs");
        sub.select("id").where_("id >", 3);

        let mut qb = QueryBuilder::new(conn.clone());
        qb.test_mode(true).from_subquery(&sub, "t").where_("t.id <", 10);
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM (SELECT id FROM jobs WHERE id > 3) As t WHERE t.id < 10"
        );
        assert!(!sub.state().is_empty());
    }

    #[test]
    fn from_subquery_with_prefix() {
        let conn = mysql("db_");
        let mut sub = test_builder(&conn, "jobs");
        sub.select("id").where_("id >", 3);

        let mut qb = QueryBuilder::new(conn.clone());
        qb.test_mode(true).from_subquery(&sub, "t").where_("t.id <", 10);
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM (SELECT id FROM db_jobs WHERE id > 3) As t WHERE t.id < 10"
        );
    }

    #[test]
    fn prefixed_qualifiers_follow_unaliased_tables() {
        let conn = mysql("db_");
        let mut qb = test_builder(&conn, "jobs");
        qb.select("jobs.id, tags.name")
            .join("tags", "tags.job_id = jobs.id")
            .where_("jobs.id", 1)
            .order_by_desc("tags.name");
        assert_eq!(
            rendered(qb.get()),
            "SELECT db_jobs.id, db_tags.name FROM db_jobs JOIN db_tags ON db_tags.job_id = db_jobs.id WHERE db_jobs.id = 1 ORDER BY db_tags.name DESC"
        );
    }

    #[test]
    fn where_map_expands_to_and_conditions() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_map([("status", "open"), ("city", "Auckland")]);
        assert_eq!(
            rendered(qb.get()),
            "SELECT * FROM jobs WHERE status = 'open' AND city = 'Auckland'"
        );
    }

    #[test]
    fn get_executes_against_connection() {
        let conn = mysql("");
        conn.push_result(
            ResultSet::new(["id", "name"])
                .with_row([SqlValue::from(1_i64), SqlValue::from("alice")])
                .with_row([SqlValue::from(2_i64), SqlValue::from("bob")]),
        );
        let mut qb = QueryBuilder::table(conn.clone(), "users");
        let rows = qb.where_("active", true).get().unwrap().into_rows().unwrap();
        assert_eq!(rows.num_rows(), 2);
        assert_eq!(
            conn.last_query().as_deref(),
            Some("SELECT * FROM users WHERE active = TRUE")
        );
        assert!(qb.state().is_empty());
    }

    #[test]
    fn first_value_and_values() {
        let conn = mysql("");
        let users = || {
            ResultSet::new(["id", "name"])
                .with_row([SqlValue::from(1_i64), SqlValue::from("alice")])
                .with_row([SqlValue::from(2_i64), SqlValue::from("bob")])
        };
        conn.push_result(users());
        conn.push_result(users());
        conn.push_result(users());
        conn.push_result(users());

        let mut qb = QueryBuilder::table(conn.clone(), "users");
        let row = qb.first().unwrap().into_row().unwrap();
        assert_eq!(row.get("name"), Some(&SqlValue::from("alice")));
        assert_eq!(conn.last_query().as_deref(), Some("SELECT * FROM users LIMIT 1"));

        qb.from("users");
        let name = qb.value("name").unwrap().into_scalar().unwrap();
        assert_eq!(name, SqlValue::from("alice"));

        qb.from("users");
        let ids = qb.values("id").unwrap().into_column().unwrap();
        assert_eq!(ids, vec![SqlValue::I64(1), SqlValue::I64(2)]);

        qb.from("users");
        assert_eq!(qb.row(5).unwrap(), ExecResult::Row(None));
    }

    #[test]
    fn connection_error_is_propagated_and_state_kept() {
        let conn = mysql("");
        conn.push_error(ConnectionError::new("server has gone away").with_code(2006));
        let mut qb = QueryBuilder::table(conn.clone(), "jobs");
        qb.where_("id", 1);

        let err = qb.get().unwrap_err();
        assert!(!err.is_builder_error());
        assert_eq!(err.to_string(), "server has gone away");
        assert_eq!(qb.state().wheres.len(), 1);

        let rows = qb.get().unwrap().into_rows().unwrap();
        assert!(rows.is_empty());
        assert_eq!(conn.executed().len(), 2);
    }

    #[test]
    fn test_mode_never_touches_connection() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.get().unwrap();
        qb.from("jobs").set("name", "x").insert().unwrap();
        qb.from("jobs").count().unwrap();
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn preserve_keeps_state_for_next_call() {
        let conn = mysql("");
        let mut qb = test_builder(&conn, "jobs");
        qb.where_("id >", 3).limit(10);
        assert_eq!(
            rendered(qb.preserve().count()),
            "SELECT COUNT(*) As num_rows FROM jobs WHERE id > 3"
        );
        assert_eq!(rendered(qb.get()), "SELECT * FROM jobs WHERE id > 3 LIMIT 10");
        assert!(qb.state().is_empty());
    }

    #[test]
    fn remembered_count_is_served_from_cache() {
        let conn = mysql("");
        conn.push_result(ResultSet::new(["num_rows"]).with_row([7_i64]));
        let cache = Rc::new(MemoryCache::new());
        let mut qb = QueryBuilder::table(conn.clone(), "jobs").with_cache(cache.clone());

        let first = qb.remember("open_jobs", Duration::from_secs(60)).count().unwrap();
        assert_eq!(first, ExecResult::Scalar(SqlValue::U64(7)));

        qb.from("jobs");
        let second = qb.remember("open_jobs", Duration::from_secs(60)).count().unwrap();
        assert_eq!(second, ExecResult::Scalar(SqlValue::U64(7)));
        assert_eq!(conn.executed().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_mode_caches_rendered_sql() {
        let conn = mysql("");
        let cache = Rc::new(MemoryCache::new());
        let mut qb = QueryBuilder::table(conn.clone(), "jobs").with_cache(cache.clone());
        qb.test_mode(true);

        let sql = "SELECT COUNT(*) As num_rows FROM jobs";
        let first = qb.remember("jobs", Duration::from_secs(60)).count().unwrap();
        assert_eq!(first, ExecResult::Rendered(sql.to_string()));
        assert_eq!(cache.len(), 1);

        qb.from("jobs");
        let second = qb.remember("jobs", Duration::from_secs(60)).count().unwrap();
        assert_eq!(second, ExecResult::Rendered(sql.to_string()));
        assert_eq!(cache.len(), 1);
        assert!(conn.executed().is_empty());
    }

    #[test]
    fn test_mode_serves_cached_sql_for_same_key_and_shape() {
        let conn = mysql("");
        let cache = Rc::new(MemoryCache::new());
        let mut qb = QueryBuilder::table(conn.clone(), "jobs").with_cache(cache.clone());
        qb.test_mode(true);
        qb.remember("jobs", Duration::from_secs(60)).count().unwrap();

        // 同一 key 下换了查询形状就是另一条缓存
        qb.from("jobs").where_("id >", 3);
        let other = qb.remember("jobs", Duration::from_secs(60)).count().unwrap();
        assert_eq!(
            other,
            ExecResult::Rendered("SELECT COUNT(*) As num_rows FROM jobs WHERE id > 3".to_string())
        );
        assert_eq!(cache.len(), 2);
    }
}
