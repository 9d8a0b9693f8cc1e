use bugdesk_core::config::Config;
use bugdesk_core::error::Result;
use bugdesk_core::model::submission::Submission;
use bugdesk_core::notify::{Notification, Notifier};
use bugdesk_core::repository::ReportRepository;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(i64),
    Merged(i64),
}

impl SubmitOutcome {
    pub fn id(self) -> i64 {
        match self {
            Self::Created(id) | Self::Merged(id) => id,
        }
    }
}

/// Create-or-merge handler for incoming bug reports.
pub struct Intake<R, N> {
    repo: R,
    notifier: N,
    config: Config,
}

impl<R, N> Intake<R, N>
where
    R: ReportRepository,
    N: Notifier,
{
    pub fn new(repo: R, notifier: N, config: Config) -> Self {
        Self {
            repo,
            notifier,
            config,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Stores `submission`, folding it into an existing report with the same
    /// log when there is one. Only storage failures are returned; a failed
    /// notification is logged and the new id is still reported.
    pub async fn submit(&self, submission: Submission) -> Result<SubmitOutcome> {
        let Some(existing) = self.repo.find_by_log(&submission.log)? else {
            let id = self.repo.insert_report(&submission)?;
            info!(id, os = %submission.os, version = %submission.version, "new bug report");
            self.send_notification(Notification::new_report(&self.config, id, &submission.log))
                .await;
            return Ok(SubmitOutcome::Created(id));
        };

        let update = existing.absorb(&submission);
        self.repo.update_report(&update)?;
        info!(
            id = update.id,
            count = update.count,
            status = update.status,
            reopened = update.status != existing.status,
            "merged bug report"
        );
        Ok(SubmitOutcome::Merged(update.id))
    }

    async fn send_notification(&self, notification: Notification) {
        let id = notification.id;
        match tokio::time::timeout(
            self.config.notify_timeout,
            self.notifier.notify(&notification),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(id, error = %err, "bug report notification failed"),
            Err(_) => warn!(
                id,
                timeout = ?self.config.notify_timeout,
                "bug report notification timed out"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bugdesk_core::status::{STATUS_REOPENED, STATUS_RESOLVED};
    use bugdesk_store::Store;
    use testkit::{FailingNotifier, RecordingNotifier, submission};

    use super::*;

    fn intake<N: Notifier>(notifier: N) -> Intake<Store, N> {
        let store = Store::open_in_memory("bug_reports").unwrap();
        Intake::new(store, notifier, Config::default())
    }

    #[tokio::test]
    async fn first_submission_creates_row_and_notifies_once() {
        let notifier = RecordingNotifier::default();
        let intake = intake(notifier.clone());

        let outcome = intake
            .submit(submission("win", "11", "2.0", "Y"))
            .await
            .unwrap();
        let SubmitOutcome::Created(id) = outcome else {
            panic!("expected a new report, got {outcome:?}");
        };

        let row = intake.repository().get_report(id).unwrap().unwrap();
        assert_eq!(row.count, 1);
        assert_eq!(row.os, "win");
        assert_eq!(row.java, "11");
        assert_eq!(row.version, "2.0");
        assert_eq!(row.log, "Y");
        assert_eq!(intake.repository().summary().unwrap().reports, 1);

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, id);
        assert!(sent[0].body.contains(&format!("BugID: {id}")));
        assert!(sent[0].permalink.ends_with(&format!("#bugid{id}")));
        assert!(sent[0].body.ends_with("\r\n\r\nY"));
    }

    #[tokio::test]
    async fn repeat_submission_merges_without_notifying() {
        let notifier = RecordingNotifier::default();
        let intake = intake(notifier.clone());

        let first = intake
            .submit(submission("linux", "17", "1.0", "X"))
            .await
            .unwrap();
        let second = intake
            .submit(submission("linux", "21", "1.0", "X"))
            .await
            .unwrap();

        assert_eq!(second, SubmitOutcome::Merged(first.id()));
        let row = intake.repository().get_report(first.id()).unwrap().unwrap();
        assert_eq!(row.count, 2);
        assert_eq!(row.os, "linux");
        assert_eq!(row.java, "17;21");
        assert_eq!(row.version, "1.0");
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn resolved_report_is_reopened() {
        let intake = intake(RecordingNotifier::default());
        let id = intake
            .submit(submission("linux", "17", "1.0", "X"))
            .await
            .unwrap()
            .id();
        intake.repository().set_status(id, STATUS_RESOLVED).unwrap();

        let outcome = intake
            .submit(submission("mac", "", "", "X"))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Merged(id));

        let row = intake.repository().get_report(id).unwrap().unwrap();
        assert_eq!(row.os, "linux;mac");
        assert_eq!(row.count, 2);
        assert_eq!(row.status, STATUS_REOPENED);
    }

    #[tokio::test]
    async fn triaged_status_survives_resubmission() {
        let intake = intake(RecordingNotifier::default());
        let id = intake
            .submit(submission("linux", "17", "1.0", "X"))
            .await
            .unwrap()
            .id();
        intake.repository().set_status(id, 2).unwrap();

        intake
            .submit(submission("linux", "17", "1.0", "X"))
            .await
            .unwrap();

        let row = intake.repository().get_report(id).unwrap().unwrap();
        assert_eq!(row.status, 2);
        assert_eq!(row.count, 2);
    }

    #[tokio::test]
    async fn identical_resubmissions_keep_accumulators_stable() {
        let intake = intake(RecordingNotifier::default());
        let id = intake
            .submit(submission("linux", "17", "1.0", "X"))
            .await
            .unwrap()
            .id();
        for _ in 0..3 {
            intake
                .submit(submission("mac", "17", "1.0", "X"))
                .await
                .unwrap();
        }

        let row = intake.repository().get_report(id).unwrap().unwrap();
        assert_eq!(row.os, "linux;mac");
        assert_eq!(row.count, 4);
    }

    #[tokio::test]
    async fn failed_notification_still_returns_id() {
        let intake = intake(FailingNotifier);
        let outcome = intake
            .submit(submission("win", "11", "2.0", "boom"))
            .await
            .unwrap();

        assert!(matches!(outcome, SubmitOutcome::Created(_)));
        assert!(intake.repository().get_report(outcome.id()).unwrap().is_some());
    }

    struct StalledNotifier;

    impl Notifier for StalledNotifier {
        async fn notify(&self, _notification: &Notification) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn stalled_notification_is_cut_off() {
        let store = Store::open_in_memory("bug_reports").unwrap();
        let config = Config {
            notify_timeout: Duration::from_millis(20),
            ..Config::default()
        };
        let intake = Intake::new(store, StalledNotifier, config);

        let outcome = intake
            .submit(submission("win", "11", "2.0", "slow"))
            .await
            .unwrap();
        assert!(matches!(outcome, SubmitOutcome::Created(_)));
    }

    #[tokio::test]
    async fn oldest_of_duplicate_rows_absorbs_submission() {
        let intake = intake(RecordingNotifier::default());
        let repo = intake.repository();
        let older = repo.insert_report(&submission("a", "", "", "dup")).unwrap();
        let newer = repo.insert_report(&submission("b", "", "", "dup")).unwrap();

        let outcome = intake
            .submit(submission("c", "", "", "dup"))
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Merged(older));
        assert_eq!(repo.get_report(older).unwrap().unwrap().os, "a;c");
        assert_eq!(repo.get_report(newer).unwrap().unwrap().count, 1);
    }
}
