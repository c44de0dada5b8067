use super::strict::STRICT_LINE;
use super::{clean_key, clean_value, is_indented, LineFormat, Step};
use crate::whois::parser::ParseState;
use crate::whois::value::{merge_field, Value};

/// `key: value` pairs where indented lines continue the previous key and a
/// bare `key:` opens a list filled by the unindented lines after it.
///
/// ```text
/// DOMAIN NAME:           example.pl
/// nameservers:           ns1.example.pl. [192.0.2.1]
///                        ns2.example.pl. [192.0.2.2]
/// REGISTRAR:
/// Example Registrar Sp. z o.o.
/// ul. Przykladowa 1
/// ```
pub struct TwoColumnsAddIfMissing;

impl LineFormat for TwoColumnsAddIfMissing {
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step {
        let text = line.trim().to_string();

        if is_indented(line) {
            return match state.previous_key.clone() {
                Some(key) => Step::Field(key, Value::Scalar(text)),
                None => Step::Comment(text),
            };
        }

        if let Some(caps) = STRICT_LINE.captures(line) {
            let key = clean_key(&caps[1]);
            let value = clean_value(&caps[2]);
            if !value.is_empty() {
                return Step::Field(key, Value::Scalar(value));
            }
            if !key.is_empty() {
                state
                    .doc
                    .entry(key.clone())
                    .or_insert_with(|| Value::List(Vec::new()));
                state.open_field = Some(key.clone());
                state.previous_key = Some(key);
                return Step::Skip;
            }
        }

        match state.open_field.clone() {
            Some(field) => {
                merge_field(&mut state.doc, &field, Value::Scalar(text.clone()));
                Step::Placed(field, text)
            }
            None => Step::Comment(text),
        }
    }

    fn blank_line(&self, state: &mut ParseState) {
        state.close_block();
        state.open_field = None;
    }
}
