use once_cell::sync::Lazy;
use regex::Regex;

use super::{clean_key, clean_value, LineFormat, Step};
use crate::whois::parser::ParseState;
use crate::whois::value::{merge_field, Object, Value};

static BRACKET_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\[?[^\]:]+[\]:])\s*(.+)?").expect("Invalid bracket regex"));

/// `Heading: value` opens an object filled by the `[key] value` lines
/// that follow; unmatched lines continue the previous key.
///
/// ```text
/// Domain Information: [Domain Information]
/// [Domain Name]                   EXAMPLE.JP
/// [Postal Address]                Tokyo
///                                 Shibuya-ku
/// ```
pub struct TwoColumnsBrackets;

impl LineFormat for TwoColumnsBrackets {
    fn parse_line(&self, line: &str, state: &mut ParseState) -> Step {
        let Some(caps) = BRACKET_LINE.captures(line) else {
            return continuation(line, state);
        };
        let cleaned = clean_key(&caps[1]);
        let raw_key = cleaned.trim_end_matches(':').trim();
        let value = caps.get(2).map(|m| clean_value(m.as_str())).unwrap_or_default();

        if !raw_key.starts_with('[') {
            if raw_key.is_empty() || value.is_empty() {
                return continuation(line, state);
            }
            let key = raw_key.to_string();
            let mut heading = Object::new();
            heading.insert(key.clone(), Value::Scalar(value.clone()));
            merge_field(&mut state.doc, &key, Value::Object(heading));
            state.tracker.object_name = Some(key.clone());
            state.previous_key = Some(key.clone());
            return Step::Placed(key, value);
        }

        let key = raw_key
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim()
            .to_string();
        if key.is_empty() || value.is_empty() {
            state.previous_key = Some(key);
            return Step::Skip;
        }

        match state.tracker.object_name.clone() {
            Some(object) => match state.doc.get(&object) {
                Some(Value::Object(_)) | Some(Value::ObjectList(_)) | None => {
                    state
                        .tracker
                        .add_to_object(&mut state.doc, &object, &key, value.clone());
                }
                Some(_) => merge_field(&mut state.doc, &key, Value::Scalar(value.clone())),
            },
            None => merge_field(&mut state.doc, &key, Value::Scalar(value.clone())),
        }
        state.previous_key = Some(key.clone());
        Step::Placed(key, value)
    }
}

fn continuation(line: &str, state: &mut ParseState) -> Step {
    let text = line.trim().to_string();
    if text.is_empty() {
        return Step::Skip;
    }
    let Some(object) = state.tracker.object_name.clone() else {
        return Step::Comment(text);
    };
    let field = state.previous_key.clone().unwrap_or_else(|| object.clone());
    state
        .tracker
        .add_to_object(&mut state.doc, &object, &field, text.clone());
    Step::Placed(field, text)
}

#[cfg(test)]
mod tests {
    use crate::whois::parser::parse_response;
    use crate::whois::value::Value;

    const JPRS: &str = "\
[ JPRS database provides information on network administration. Its use is    ]
[ restricted to network administration purposes.                             ]

Domain Information: [Domain Info]
[Domain Name]                   EXAMPLE.JP

[Registrant]                    Example Co., Ltd.

[Name Server]                   ns1.example.jp
[Name Server]                   ns2.example.jp
[Signing Key]

[Created on]                    2001/05/22
[Status]                        Active
[Last Updated]                  2024/06/01 01:05:07 (JST)

Contact Information: [Contact Info]
[Name]                          Example Co., Ltd.
[Email]                         dns-admin@example.jp
[Postal Address]                Tokyo
                                Shibuya-ku
[Phone]                         03-0000-0000
";

    #[test]
    fn test_jprs_reply() {
        let doc = parse_response("whois.jprs.jp", JPRS).document;

        let Value::Object(domain) = &doc["Domain Information"] else {
            panic!("expected an object");
        };
        assert_eq!(domain["Domain Information"], Value::scalar("[Domain Info]"));
        assert_eq!(domain["Domain Name"], Value::scalar("EXAMPLE.JP"));
        assert_eq!(domain["Registrant"], Value::scalar("Example Co., Ltd."));
        assert_eq!(
            domain["Name Server"],
            Value::List(vec!["ns1.example.jp".to_string(), "ns2.example.jp".to_string()])
        );
        assert_eq!(domain["Last Updated"], Value::scalar("2024/06/01 01:05:07 (JST)"));
        assert!(!domain.contains_key("Signing Key"));

        let Value::Object(contact) = &doc["Contact Information"] else {
            panic!("expected an object");
        };
        assert_eq!(
            contact["Postal Address"],
            Value::List(vec!["Tokyo".to_string(), "Shibuya-ku".to_string()])
        );
        assert_eq!(contact["Phone"], Value::scalar("03-0000-0000"));
    }

    #[test]
    fn test_bracket_keys_without_heading_stay_top_level() {
        let doc = parse_response("whois.jprs.jp", "[Domain Name]  EXAMPLE.JP\n").document;
        assert_eq!(doc["Domain Name"], Value::scalar("EXAMPLE.JP"));
    }
}
