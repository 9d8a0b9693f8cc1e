use bugdesk_core::error::{BugdeskError, Result};
use bugdesk_core::model::report::{BugReport, ReportUpdate};
use bugdesk_core::model::submission::Submission;
use bugdesk_core::repository::ReportRepository;
use bugdesk_core::status::STATUS_NEW;
use chrono::{NaiveDateTime, Utc};
use duckdb::{OptionalExt, Row, params};

use crate::Store;

const REPORT_COLUMNS: &str = "id, os, java, version, log, count, status, date";

impl Store {
    /// Sets the triage status of a report. Returns false when no row
    /// has `id`.
    pub fn set_status(&self, id: i64, status: i32) -> Result<bool> {
        let conn = self.conn();
        let changed = conn
            .execute(
                &format!("UPDATE {} SET status = ? WHERE id = ?", self.table()),
                params![status, id],
            )
            .map_err(|e| BugdeskError::Store(format!("set status failed: {e}")))?;
        Ok(changed > 0)
    }

    pub fn recent_reports(&self, limit: usize) -> Result<Vec<BugReport>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {REPORT_COLUMNS} FROM {} ORDER BY date DESC, id DESC LIMIT ?",
                self.table()
            ))
            .map_err(|e| BugdeskError::Store(format!("prepare recent reports failed: {e}")))?;

        let rows = stmt
            .query_map(params![limit as i64], map_report)
            .map_err(|e| BugdeskError::Store(format!("query recent reports failed: {e}")))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| BugdeskError::Store(format!("map report row failed: {e}")))?);
        }
        Ok(out)
    }
}

impl ReportRepository for Store {
    fn find_by_log(&self, log: &str) -> Result<Option<BugReport>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {REPORT_COLUMNS} FROM {} WHERE log = ? ORDER BY id ASC LIMIT 1",
                self.table()
            ),
            params![log],
            map_report,
        )
        .optional()
        .map_err(|e| BugdeskError::Store(format!("lookup by log failed: {e}")))
    }

    fn insert_report(&self, submission: &Submission) -> Result<i64> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "INSERT INTO {} (os, java, version, log, count, status, date)
                 VALUES (?, ?, ?, ?, 1, ?, ?) RETURNING id",
                self.table()
            ),
            params![
                submission.os,
                submission.java,
                submission.version,
                submission.log,
                STATUS_NEW,
                Utc::now().naive_utc(),
            ],
            |row| row.get::<_, i64>(0),
        )
        .map_err(|e| BugdeskError::Store(format!("insert report failed: {e}")))
    }

    fn update_report(&self, update: &ReportUpdate) -> Result<()> {
        let conn = self.conn();
        let changed = conn
            .execute(
                &format!(
                    "UPDATE {} SET os = ?, java = ?, version = ?, count = ?, status = ?, date = ?
                     WHERE id = ?",
                    self.table()
                ),
                params![
                    update.os,
                    update.java,
                    update.version,
                    update.count,
                    update.status,
                    Utc::now().naive_utc(),
                    update.id,
                ],
            )
            .map_err(|e| BugdeskError::Store(format!("update report failed: {e}")))?;
        if changed == 0 {
            return Err(BugdeskError::Store(format!(
                "report {} vanished before update",
                update.id
            )));
        }
        Ok(())
    }

    fn get_report(&self, id: i64) -> Result<Option<BugReport>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM {} WHERE id = ?", self.table()),
            params![id],
            map_report,
        )
        .optional()
        .map_err(|e| BugdeskError::Store(format!("get report failed: {e}")))
    }
}

fn map_report(row: &Row<'_>) -> duckdb::Result<BugReport> {
    Ok(BugReport {
        id: row.get::<_, i64>(0)?,
        os: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        java: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        version: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        log: row.get::<_, String>(4)?,
        count: row.get::<_, i64>(5)?,
        status: row.get::<_, i32>(6)?,
        date: row.get::<_, NaiveDateTime>(7)?.and_utc(),
    })
}

#[cfg(test)]
mod tests {
    use bugdesk_core::status::{STATUS_REOPENED, STATUS_RESOLVED};

    use super::*;

    fn submission(os: &str, log: &str) -> Submission {
        Submission {
            os: os.to_string(),
            java: "17".to_string(),
            version: "2.0".to_string(),
            log: log.to_string(),
        }
    }

    #[test]
    fn insert_then_find_by_exact_log() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        let id = store.insert_report(&submission("win", "Y")).unwrap();

        let found = store.find_by_log("Y").unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.os, "win");
        assert_eq!(found.count, 1);
        assert_eq!(found.status, 0);

        assert!(store.find_by_log("Y ").unwrap().is_none());
        assert!(store.find_by_log("y").unwrap().is_none());
    }

    #[test]
    fn ids_are_distinct_and_increasing() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        let a = store.insert_report(&submission("win", "A")).unwrap();
        let b = store.insert_report(&submission("win", "B")).unwrap();
        assert!(b > a);
    }

    #[test]
    fn duplicate_logs_resolve_to_lowest_id() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        let first = store.insert_report(&submission("linux", "dup")).unwrap();
        let _second = store.insert_report(&submission("mac", "dup")).unwrap();

        let found = store.find_by_log("dup").unwrap().unwrap();
        assert_eq!(found.id, first);
        assert_eq!(found.os, "linux");
    }

    #[test]
    fn update_writes_merged_values() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        let id = store.insert_report(&submission("linux", "X")).unwrap();
        assert!(store.set_status(id, STATUS_RESOLVED).unwrap());

        let before = store.get_report(id).unwrap().unwrap();
        let update = before.absorb(&submission("mac", "X"));
        store.update_report(&update).unwrap();

        let after = store.get_report(id).unwrap().unwrap();
        assert_eq!(after.os, "linux;mac");
        assert_eq!(after.count, 2);
        assert_eq!(after.status, STATUS_REOPENED);
        assert!(after.date >= before.date);
    }

    #[test]
    fn update_of_missing_row_fails() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        let err = store
            .update_report(&ReportUpdate {
                id: 99,
                os: String::new(),
                java: String::new(),
                version: String::new(),
                count: 2,
                status: 0,
            })
            .unwrap_err();
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn get_and_set_status_on_missing_id() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        assert!(store.get_report(5).unwrap().is_none());
        assert!(!store.set_status(5, 1).unwrap());
    }

    #[test]
    fn summary_counts_submissions_and_reopened() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        let id = store.insert_report(&submission("linux", "X")).unwrap();
        store.insert_report(&submission("linux", "Z")).unwrap();
        store.set_status(id, STATUS_RESOLVED).unwrap();
        let update = store.get_report(id).unwrap().unwrap().absorb(&submission("mac", "X"));
        store.update_report(&update).unwrap();

        let summary = store.summary().unwrap();
        assert_eq!(summary.reports, 2);
        assert_eq!(summary.submissions, 3);
        assert_eq!(summary.reopened, 1);

        let recent = store.recent_reports(10).unwrap();
        assert_eq!(recent.len(), 2);
    }
}
