/// DDL for the reports table. `table` must already be a validated identifier.
pub fn schema_sql(table: &str) -> String {
    format!(
        r#"
CREATE SEQUENCE IF NOT EXISTS {table}_id_seq;

CREATE TABLE IF NOT EXISTS {table} (
  id BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq'),
  os TEXT,
  java TEXT,
  version TEXT,
  log TEXT NOT NULL,
  count BIGINT NOT NULL DEFAULT 1,
  status INTEGER NOT NULL DEFAULT 0,
  date TIMESTAMP NOT NULL DEFAULT current_timestamp
);
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_uses_table_name() {
        let sql = schema_sql("reports");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS reports ("));
        assert!(sql.contains("nextval('reports_id_seq')"));
    }
}
