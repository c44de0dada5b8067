use once_cell::sync::Lazy;
use regex::Regex;

use super::{clean_key, clean_value, is_url_fragment, LineFormat, Step};
use crate::whois::parser::ParseState;
use crate::whois::value::Value;

pub(crate) static STRICT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^\s][^:]+):\s*(.*)$").expect("Invalid two-column regex"));

/// `key: value` per line; the default for gTLD registries and RIRs.
///
/// Lines without a colon continue the previous key on servers flagged as
/// two-column, and are kept as comments elsewhere.
pub struct TwoColumnsStrict;

impl LineFormat for TwoColumnsStrict {
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step {
        let Some(caps) = STRICT_LINE.captures(line) else {
            let text = line.trim().to_string();
            if state.profile.two_column {
                if let Some(key) = state.previous_key.clone() {
                    return Step::Field(key, Value::Scalar(text));
                }
            }
            return Step::Comment(text);
        };

        let value = caps[2].trim();
        if is_url_fragment(&caps[1], value) {
            return Step::Comment(line.trim().to_string());
        }

        let key = clean_key(&caps[1]);
        if key.is_empty() {
            return Step::Comment(line.trim().to_string());
        }
        Step::Field(key, Value::Scalar(clean_value(value)))
    }
}
