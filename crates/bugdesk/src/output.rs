use bugdesk_core::model::report::{BugReport, StoreSummary};
use bugdesk_core::status::{STATUS_REOPENED, STATUS_RESOLVED};
use chrono::SecondsFormat;
use owo_colors::OwoColorize;

pub fn print_report_human(report: &BugReport) {
    println!(
        "BUG {} status={} count={} last={}",
        report.id,
        status_label(report.status),
        report.count,
        report.date.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    println!("  os:      {}", report.os);
    println!("  java:    {}", report.java);
    println!("  version: {}", report.version);
    println!("--");
    println!("{}", report.log);
}

pub fn print_reports_human(reports: &[BugReport]) {
    for r in reports {
        let first_line = r.log.lines().next().unwrap_or_default();
        println!(
            "{:>6} {} x{} {} | {}",
            r.id,
            status_label(r.status),
            r.count,
            r.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            first_line
        );
    }
    println!("-- {} reports --", reports.len());
}

pub fn print_summary_human(v: &StoreSummary) {
    println!("db_path={}", v.db_path);
    println!("table={}", v.table);
    println!("reports={}", v.reports);
    println!("submissions={}", v.submissions);
    println!("reopened={}", v.reopened);
}

fn status_label(status: i32) -> String {
    match status {
        STATUS_REOPENED => "reopened".red().to_string(),
        STATUS_RESOLVED => "resolved".green().to_string(),
        other => format!("{}", other.yellow()),
    }
}
