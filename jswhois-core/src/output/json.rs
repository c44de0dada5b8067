use super::OutputFormatter;
use crate::chain::LookupResult;
use crate::error::Result;

/// Renders results as JSON; a batch becomes one array.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// One line per batch.
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn to_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_result(&self, result: &LookupResult) -> Result<String> {
        self.to_json(result)
    }

    fn format_results(&self, results: &[LookupResult]) -> Result<String> {
        self.to_json(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::DoneReason;
    use crate::whois::{Document, Value};

    fn result(query: &str) -> LookupResult {
        let mut doc = Document::new();
        doc.insert("domain".to_string(), Value::scalar("ORG"));
        doc.insert(
            "status".to_string(),
            Value::List(vec!["ACTIVE".to_string(), "ok".to_string()]),
        );
        LookupResult {
            query: query.to_string(),
            chain: vec!["whois.iana.org".to_string()],
            documents: vec![("whois.iana.org".to_string(), doc)],
            done: DoneReason::RecursionDisabled,
        }
    }

    #[test]
    fn test_compact_by_default() {
        let json = JsonFormatter::new().format_result(&result("org")).unwrap();
        assert!(!json.contains('\n'));
        assert_eq!(
            json,
            r#"{"query":"org","chain":["whois.iana.org"],"whois.iana.org":{"domain":"ORG","status":["ACTIVE","ok"]}}"#
        );
    }

    #[test]
    fn test_batch_is_an_array_in_order() {
        let results = vec![result("first.example"), result("second.example")];
        let json = JsonFormatter::new().format_results(&results).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["query"], "first.example");
        assert_eq!(items[1]["query"], "second.example");
    }

    #[test]
    fn test_pretty_output() {
        let json = JsonFormatter::new()
            .pretty(true)
            .format_results(&[result("org")])
            .unwrap();
        assert!(json.contains("\n  {"));
        assert!(json.contains("\"chain\""));
    }
}
