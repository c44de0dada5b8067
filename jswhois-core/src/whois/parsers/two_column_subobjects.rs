use super::{clean_key, clean_value, LineFormat, Step, INDENTED_KEY, KEY_VALUE};
use crate::whois::parser::ParseState;
use crate::whois::value::{merge_field, Value};

/// A bare name after a blank line opens an object; indented `key: value`
/// lines fill it and unindented pairs stay at the top level.
///
/// ```text
/// Registrant
///   Organization:     Example S.p.A.
///   Address:          Via Esempio 1
///                     Milano
/// ```
///
/// A further block of pairs under the same name, after a blank line, turns
/// the object into a list of objects.
pub struct TwoColumnSubobjects;

impl LineFormat for TwoColumnSubobjects {
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step {
        let is_pair = KEY_VALUE.is_match(line);
        let (indented, key, value) = match INDENTED_KEY.captures(line) {
            Some(caps) => (
                !caps[1].is_empty(),
                clean_key(&caps[2]),
                caps.get(3).map(|m| clean_value(m.as_str())).unwrap_or_default(),
            ),
            None => (false, String::new(), line.trim().to_string()),
        };

        if !is_pair {
            if state.new_block {
                let name = line.trim().trim_end_matches(':').trim();
                if name.is_empty() {
                    return Step::Skip;
                }
                state.tracker.open_named(&mut state.doc, name);
                state.previous_key = None;
                return Step::Skip;
            }

            let object = match state.tracker.object_name.clone() {
                Some(object) if state.doc.contains_key(&object) => object,
                _ if value.is_empty() => return Step::Skip,
                _ => return Step::Comment(value),
            };
            if value.is_empty() {
                return Step::Skip;
            }
            let field = state.previous_key.clone().unwrap_or_else(|| object.clone());
            state
                .tracker
                .add_to_object(&mut state.doc, &object, &field, value.clone());
            return Step::Placed(field, value);
        }

        let object = state
            .tracker
            .object_name
            .get_or_insert_with(|| key.clone())
            .clone();

        if state.doc.contains_key(&object) {
            if state.new_block {
                state
                    .tracker
                    .add_new_subobject(&mut state.doc, &object, &key, value.clone());
            } else if indented {
                state
                    .tracker
                    .add_to_object(&mut state.doc, &object, &key, value.clone());
            } else {
                merge_field(&mut state.doc, &key, Value::Scalar(value.clone()));
            }
        } else {
            merge_field(&mut state.doc, &key, Value::Scalar(value.clone()));
            state.tracker.object_name = None;
        }

        state.previous_key = Some(key.clone());
        Step::Placed(key, value)
    }
}
