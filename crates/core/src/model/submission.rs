use serde::{Deserialize, Serialize};

/// One incoming report as posted by a client. Missing form fields are kept
/// as empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Submission {
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub java: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub log: String,
}
