//! Triage status codes stored in the `status` column.

pub const STATUS_NEW: i32 = 0;
pub const STATUS_RESOLVED: i32 = 4;
pub const STATUS_REOPENED: i32 = -1;

/// A new submission against a resolved report reopens it; every other
/// status is left for triage to handle.
pub fn reopen(status: i32) -> i32 {
    if status == STATUS_RESOLVED {
        STATUS_REOPENED
    } else {
        status
    }
}
