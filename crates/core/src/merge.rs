//! Accumulator fields: `;`-joined strings that stand in for a set of
//! observed values.

pub const DELIMITER: char = ';';

/// Distinct non-empty tokens of an accumulator, in first-seen order.
pub fn tokens(acc: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for token in acc.split(DELIMITER) {
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Adds `value` to the accumulator `acc` and returns the new string.
///
/// Existing order is kept and `value` goes last unless already present.
/// Empty tokens are dropped, so an empty accumulator never yields a leading
/// `;`.
pub fn add_token(acc: &str, value: &str) -> String {
    let mut out = tokens(acc);
    if !value.is_empty() && !out.contains(&value) {
        out.push(value);
    }
    out.join(&DELIMITER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_new_value() {
        assert_eq!(add_token("linux", "mac"), "linux;mac");
        assert_eq!(add_token("linux;mac", "win"), "linux;mac;win");
    }

    #[test]
    fn skips_known_value() {
        assert_eq!(add_token("linux;mac", "linux"), "linux;mac");
    }

    #[test]
    fn repeated_merge_is_idempotent() {
        let once = add_token("linux", "mac");
        let thrice = add_token(&add_token(&once, "mac"), "mac");
        assert_eq!(once, thrice);
    }

    #[test]
    fn empty_accumulator_has_no_leading_delimiter() {
        assert_eq!(add_token("", "linux"), "linux");
    }

    #[test]
    fn empty_value_leaves_accumulator_alone() {
        assert_eq!(add_token("linux", ""), "linux");
        assert_eq!(add_token("", ""), "");
    }

    #[test]
    fn collapses_duplicates_already_stored() {
        assert_eq!(add_token("a;b;a;;b", "c"), "a;b;c");
        assert_eq!(tokens("a;;b;a"), vec!["a", "b"]);
    }
}
