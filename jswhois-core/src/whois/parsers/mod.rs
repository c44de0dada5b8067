//! Line formats used by WHOIS servers.
//!
//! Each server's replies follow one of a handful of line shapes. A
//! [`LineFormat`] turns one content line into a [`Step`]; the document
//! builder in [`super::parser`] owns everything shared between formats
//! (comments, referrals, blank-line grouping, nameserver annotations).

mod add_if_missing;
mod brackets;
mod column_continue;
mod multiline;
mod simple_subobjects;
mod strict;
mod two_column_subobjects;

use once_cell::sync::Lazy;
use regex::Regex;

use super::parser::ParseState;
use super::servers::Format;
use super::value::Value;
pub use add_if_missing::TwoColumnsAddIfMissing;
pub use brackets::TwoColumnsBrackets;
pub use column_continue::ColumnContinue;
pub use multiline::Multiline;
pub use simple_subobjects::SimpleSubobjects;
pub use strict::TwoColumnsStrict;
pub use two_column_subobjects::TwoColumnSubobjects;

/// What a format made of one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A pair for the builder to place.
    Field(String, Value),
    /// Already placed by the format; only checked for referrals.
    Placed(String, String),
    /// Unrecognised text, kept under `comments`.
    Comment(String),
    Skip,
}

/// Parsing rules for one line shape.
pub trait LineFormat: Send + Sync {
    /// Handle one non-blank content line.
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step;

    fn blank_line(&self, state: &mut ParseState) {
        state.close_block();
    }

    /// Called once after the last line or an end marker.
    fn finish(&self, state: &mut ParseState) {
        state.close_block();
    }
}

/// The line format implementing `format`.
pub fn line_format(format: Format) -> &'static dyn LineFormat {
    match format {
        Format::TwoColumnsStrict => &TwoColumnsStrict,
        Format::TwoColumnsAddIfMissing => &TwoColumnsAddIfMissing,
        Format::ColumnContinue => &ColumnContinue,
        Format::SimpleSubobjects => &SimpleSubobjects,
        Format::TwoColumnSubobjects => &TwoColumnSubobjects,
        Format::TwoColumnsBrackets => &TwoColumnsBrackets,
        Format::Multiline => &Multiline,
    }
}

/// `key: value` with at least one space after the colon.
pub(crate) static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:]+):\s+(.+)$").expect("Invalid key/value regex"));

/// Optionally indented `key:` with an optional value.
pub(crate) static INDENTED_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)([^:]+):(\s+.*)?$").expect("Invalid indented key regex"));

/// Keys lose padding dots (`Domain Name.......`) and surrounding space.
pub(crate) fn clean_key(key: &str) -> String {
    key.trim_end_matches('.').trim().to_string()
}

/// Values lose surrounding space and leading padding dots.
pub(crate) fn clean_value(value: &str) -> String {
    value.trim().trim_start_matches('.').trim_start().to_string()
}

/// `http: //example.net` is a URL split at its scheme, not a field.
pub(crate) fn is_url_fragment(key: &str, value: &str) -> bool {
    let key = key.trim_end();
    (key.ends_with("http") || key.ends_with("https")) && value.starts_with("//")
}

pub(crate) fn is_indented(line: &str) -> bool {
    line.starts_with(|c: char| c.is_whitespace())
}
