use once_cell::sync::Lazy;
use regex::Regex;

use super::{clean_key, clean_value, LineFormat, Step};
use crate::whois::parser::ParseState;
use crate::whois::value::Value;

static COLUMN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([^:]+):\s*(.*)$").expect("Invalid column regex"));

/// Aligned `key : value` columns where an empty key continues the
/// previous one and comma separated values become lists.
///
/// ```text
/// Owner Addr    : 1 Example Street
///               : Ashgabat
/// ```
pub struct ColumnContinue;

impl LineFormat for ColumnContinue {
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step {
        let (key, value) = match COLUMN_LINE.captures(line) {
            Some(caps) => (clean_key(&caps[2]), clean_value(&caps[3])),
            None => (String::new(), line.trim().to_string()),
        };

        let key = if key.is_empty() {
            match state.previous_key.clone() {
                Some(previous) => previous,
                None => return Step::Comment(value),
            }
        } else {
            key
        };

        if value.contains(',') {
            let pieces: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            if pieces.is_empty() {
                return Step::Skip;
            }
            return Step::Field(key, Value::List(pieces));
        }
        Step::Field(key, Value::Scalar(value))
    }
}
