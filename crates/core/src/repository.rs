use crate::error::Result;
use crate::model::report::{BugReport, ReportUpdate};
use crate::model::submission::Submission;

/// Persistence port used by the intake path.
pub trait ReportRepository: Send + Sync {
    /// First report whose log equals `log` exactly, lowest id first.
    fn find_by_log(&self, log: &str) -> Result<Option<BugReport>>;

    /// Stores a fresh report with count 1 and returns its id.
    fn insert_report(&self, submission: &Submission) -> Result<i64>;

    /// Writes merged values back and refreshes the report's date.
    fn update_report(&self, update: &ReportUpdate) -> Result<()>;

    fn get_report(&self, id: i64) -> Result<Option<BugReport>>;
}
