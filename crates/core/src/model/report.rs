use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::merge::add_token;
use crate::model::submission::Submission;
use crate::status;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BugReport {
    pub id: i64,
    pub os: String,
    pub java: String,
    pub version: String,
    pub log: String,
    pub count: i64,
    pub status: i32,
    pub date: DateTime<Utc>,
}

/// Values written back when a submission is folded into an existing report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportUpdate {
    pub id: i64,
    pub os: String,
    pub java: String,
    pub version: String,
    pub count: i64,
    pub status: i32,
}

impl BugReport {
    pub fn absorb(&self, submission: &Submission) -> ReportUpdate {
        ReportUpdate {
            id: self.id,
            os: add_token(&self.os, &submission.os),
            java: add_token(&self.java, &submission.java),
            version: add_token(&self.version, &submission.version),
            count: self.count + 1,
            status: status::reopen(self.status),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSummary {
    pub db_path: String,
    pub table: String,
    pub reports: usize,
    pub submissions: i64,
    pub reopened: usize,
}
