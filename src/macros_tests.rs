#[cfg(test)]
mod tests {
    use crate::{ConnectionConfig, Flavor, MockConnection, QueryBuilder};
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    fn builder(table: &str) -> QueryBuilder {
        let conn = Rc::new(MockConnection::new(
            ConnectionConfig::new("test").with_flavor(Flavor::MySQL),
        ));
        let mut qb = QueryBuilder::table(conn, table);
        qb.test_mode(true);
        qb
    }

    #[test]
    fn select_and_group_macros() {
        let mut qb = builder("users");
        crate::select_fields!(qb, "country", ["city", "zip"]);
        crate::group_by_fields!(qb, "country", "city");
        assert_eq!(
            qb.sql().unwrap(),
            "SELECT country, city, zip FROM users GROUP BY country, city"
        );
    }

    #[test]
    fn where_and_set_maps() {
        let mut qb = builder("jobs");
        crate::set_map!(qb, "name" => "dev", "salary" => 10);
        crate::where_map!(qb, "id >" => 3, "status" => "open");
        let sql = qb.update().unwrap().into_sql().unwrap();
        assert_eq!(
            sql,
            "UPDATE jobs SET name = 'dev', salary = 10 WHERE id > 3 AND status = 'open'"
        );
    }
}
