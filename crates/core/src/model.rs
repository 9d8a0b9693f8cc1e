pub mod report;
pub mod submission;
