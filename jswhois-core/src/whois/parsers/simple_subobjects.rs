use super::{clean_key, clean_value, LineFormat, Step, INDENTED_KEY};
use crate::whois::parser::ParseState;
use crate::whois::value::{merge_field, Value};

/// A bare `Heading:` opens a section; indented `key: value` lines inside
/// it form an object and value-only lines are listed under the heading.
///
/// ```text
/// Technical:
///         Organisation: Example Org
///         Email: tech@example.eu
///
/// Name servers:
///         ns1.example.eu
/// ```
///
/// Blank lines carry no meaning here; a section ends at the next heading.
pub struct SimpleSubobjects;

impl LineFormat for SimpleSubobjects {
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step {
        let (key, value) = match INDENTED_KEY.captures(line) {
            Some(caps) => (
                clean_key(&caps[2]),
                caps.get(3).map(|m| clean_value(m.as_str())).unwrap_or_default(),
            ),
            None => (String::new(), line.trim().to_string()),
        };

        if !key.is_empty() && value.is_empty() {
            close_section(state);
            state.previous_key = Some(key);
            return Step::Skip;
        }

        if !key.is_empty() {
            merge_field(&mut state.tracker.group, &key, Value::Scalar(value.clone()));
            return Step::Placed(key, value);
        }

        if value.is_empty() {
            return Step::Skip;
        }
        match state.previous_key.clone() {
            Some(section) => {
                merge_field(&mut state.doc, &section, Value::Scalar(value.clone()));
                Step::Placed(section, value)
            }
            None => Step::Comment(value),
        }
    }

    fn blank_line(&self, _state: &mut ParseState) {}

    fn finish(&self, state: &mut ParseState) {
        close_section(state);
    }
}

/// Attach the pairs collected since the last heading.
fn close_section(state: &mut ParseState) {
    if state.tracker.group.is_empty() {
        return;
    }
    let group = std::mem::take(&mut state.tracker.group);
    match state.previous_key.clone() {
        Some(section) => merge_field(&mut state.doc, &section, Value::Object(group)),
        None => {
            for (key, value) in group {
                merge_field(&mut state.doc, &key, value);
            }
        }
    }
}
