//! Nameserver listings arrive as `host [address ...]` lines in a dozen
//! spellings. Expansion turns them into either a plain host list or a
//! host -> addresses table.

use once_cell::sync::Lazy;
use regex::Regex;

use super::value::{Object, Table, Value};

static NAMESERVER_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(n(ame ?)?servers?( information)?|d(omain|ns) ?(name ?)?servers?)")
        .expect("Invalid nameserver key regex")
});

/// Whether `key` names a nameserver listing (`nserver`, `Name Servers`,
/// `domain servers`, `DNS servers`, ...).
pub fn is_nameserver_key(key: &str) -> bool {
    NAMESERVER_KEY.is_match(key)
}

/// Split one listing line into host and address tokens.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for field in line.split_whitespace() {
        let trimmed = field
            .trim_start_matches(&['[', '('][..])
            .trim_end_matches(&[']', ')'][..]);
        // Addresses glued together without whitespace.
        let joined = trimmed.replace("][", ",").replace(")(", ",");
        tokens.extend(
            joined
                .split(',')
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        );
    }
    tokens
}

fn collect(lines: &[String]) -> (Vec<String>, Table, bool) {
    let mut hosts = Vec::new();
    let mut table = Table::new();
    let mut has_addresses = false;

    for line in lines {
        let mut tokens = tokenize(line).into_iter();
        let Some(host) = tokens.next() else {
            continue;
        };
        let addresses: Vec<String> = tokens.collect();
        has_addresses |= !addresses.is_empty();
        table.entry(host.clone()).or_default().extend(addresses);
        hosts.push(host);
    }

    (hosts, table, has_addresses)
}

/// Expand listing lines: a table when any line carried an address,
/// otherwise the host names in their original order.
pub fn expand(lines: &[String]) -> Value {
    let (hosts, table, has_addresses) = collect(lines);
    if has_addresses {
        Value::Table(table)
    } else {
        Value::List(hosts)
    }
}

/// Expand `value` if it is a list under a nameserver key.
pub fn expand_field(key: &str, value: Value) -> Value {
    match value {
        Value::List(lines) if is_nameserver_key(key) => expand(&lines),
        other => other,
    }
}

/// Expand every nameserver list directly inside `object`.
pub fn expand_fields(object: &mut Object) {
    let keys: Vec<String> = object
        .iter()
        .filter(|(k, v)| matches!(v, Value::List(_)) && is_nameserver_key(k))
        .map(|(k, _)| k.clone())
        .collect();
    for key in keys {
        if let Some(value) = object.remove(&key) {
            object.insert(key.clone(), expand_field(&key, value));
        }
    }
}

/// Fold `host -> annotation` pairs (`nsstat`, `remarks`, ...) into an
/// `nserver` field, producing a table keyed by host.
pub fn annotate(existing: Option<Value>, annotations: Vec<(String, Vec<String>)>) -> Value {
    let mut table = match existing {
        None => Table::new(),
        Some(Value::Scalar(line)) => collect(&[line]).1,
        Some(Value::List(lines)) => collect(&lines).1,
        Some(Value::Table(table)) => table,
        Some(other) => {
            // Not a listing; keep whatever was there under its own text.
            let mut table = Table::new();
            for text in other.into_texts() {
                table.entry(text).or_default();
            }
            table
        }
    };
    for (host, notes) in annotations {
        table.entry(host).or_default().extend(notes);
    }
    Value::Table(table)
}
