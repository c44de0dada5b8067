use super::{LineFormat, Step, KEY_VALUE};
use crate::whois::parser::ParseState;
use crate::whois::value::{merge_field, Value};

/// A `Heading:` line followed by value-only lines up to the next blank
/// line, as printed by Nominet and several ccTLDs.
///
/// ```text
///     Registrar:
///         Example Ltd t/a Example [Tag = EXAMPLE]
///         URL: https://www.example.co.uk
/// ```
///
/// Outside a section, `key: value` lines are stored as plain fields.
pub struct Multiline;

impl LineFormat for Multiline {
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step {
        let text = line.trim();
        let key = text.trim_end_matches('.').trim();

        if key.ends_with(':') {
            let heading = key.trim_end_matches(':').trim().to_string();
            if heading.is_empty() {
                return Step::Skip;
            }
            state.open_field = Some(heading.clone());
            state.previous_key = Some(heading);
            return Step::Skip;
        }

        if let Some(field) = state.open_field.clone() {
            merge_field(&mut state.doc, &field, Value::scalar(text));
            return Step::Placed(field, text.to_string());
        }

        match KEY_VALUE.captures(text) {
            Some(caps) => Step::Field(caps[1].trim().to_string(), Value::scalar(caps[2].trim())),
            None => Step::Comment(text.to_string()),
        }
    }

    fn blank_line(&self, state: &mut ParseState) {
        state.close_block();
        state.open_field = None;
    }
}
