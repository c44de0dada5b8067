//! The document tree produced from a WHOIS reply.
//!
//! Every field of a parsed reply is a [`Value`]. Repeated occurrences of a
//! key are folded together with [`Value::merge`], which promotes scalars to
//! lists and objects to lists of objects.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::error;

use crate::error::JswhoisError;

/// A grouping of fields, also the shape of one server's parsed reply.
pub type Object = BTreeMap<String, Value>;

/// Nameserver host to address list.
pub type Table = BTreeMap<String, Vec<String>>;

/// One server's parsed reply.
pub type Document = Object;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
    Object(Object),
    ObjectList(Vec<Object>),
    Table(Table),
}

/// An unsupported pair of value shapes reached the merger.
///
/// Both sides are handed back so the caller can decide how to degrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub existing: Value,
    pub incoming: Value,
}

impl MergeConflict {
    /// Log the conflict and keep both sides as a list of text.
    pub fn degrade(self, key: &str) -> Value {
        error!(
            key = %key,
            existing = self.existing.kind(),
            incoming = self.incoming.kind(),
            "Unexpected value combination; keeping both as text"
        );
        let mut texts = self.existing.into_texts();
        texts.extend(self.incoming.into_texts());
        Value::List(texts)
    }
}

impl From<MergeConflict> for JswhoisError {
    fn from(conflict: MergeConflict) -> Self {
        JswhoisError::MergeConflict {
            existing: conflict.existing.kind(),
            incoming: conflict.incoming.kind(),
        }
    }
}

impl Value {
    pub fn scalar(text: impl Into<String>) -> Self {
        Value::Scalar(text.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::ObjectList(_) => "object list",
            Value::Table(_) => "table",
        }
    }

    /// True for a scalar with no text, which never counts as content.
    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Scalar(s) if s.is_empty())
    }

    /// Merge `incoming` into the current content of a field.
    ///
    /// This is a strict left fold step: the result depends on the order in
    /// which values arrive.
    pub fn merge(slot: Option<Value>, incoming: Value) -> Result<Value, MergeConflict> {
        let Some(existing) = slot else {
            return Ok(incoming);
        };

        match (existing, incoming) {
            (Value::Scalar(s), Value::Scalar(v)) => {
                if v.is_empty() {
                    Ok(Value::Scalar(s))
                } else {
                    Ok(Value::List(vec![s, v]))
                }
            }
            (Value::Scalar(s), Value::List(l)) => {
                let mut list = Vec::with_capacity(l.len() + 1);
                list.push(s);
                list.extend(l);
                Ok(Value::List(list))
            }
            (Value::List(mut l), Value::Scalar(v)) => {
                if !v.is_empty() {
                    l.push(v);
                }
                Ok(Value::List(l))
            }
            (Value::List(mut l), Value::List(l2)) => {
                l.extend(l2);
                Ok(Value::List(l))
            }
            (Value::ObjectList(mut ol), Value::Object(o)) => {
                ol.push(o);
                Ok(Value::ObjectList(ol))
            }
            (Value::Object(o1), Value::Object(o2)) => Ok(Value::ObjectList(vec![o1, o2])),
            // A scalar that turns out to head an object yields to the object.
            (Value::Scalar(_), Value::Object(o)) => Ok(Value::Object(o)),
            (Value::Table(mut t), Value::Table(t2)) => {
                for (host, addrs) in t2 {
                    t.entry(host).or_default().extend(addrs);
                }
                Ok(Value::Table(t))
            }
            (existing, incoming) => Err(MergeConflict { existing, incoming }),
        }
    }

    /// Like [`Value::merge`], but a conflict is logged and both sides are
    /// kept as text rather than failing the parse.
    ///
    /// Under test a conflict panics instead.
    pub fn merge_or_degrade(key: &str, slot: Option<Value>, incoming: Value) -> Value {
        match Value::merge(slot, incoming) {
            Ok(merged) => merged,
            Err(conflict) => {
                if cfg!(test) {
                    panic!(
                        "cannot merge {} into {} under {:?}",
                        conflict.incoming.kind(),
                        conflict.existing.kind(),
                        key
                    );
                }
                conflict.degrade(key)
            }
        }
    }

    /// Flatten into plain text; structured shapes become compact JSON.
    pub fn into_texts(self) -> Vec<String> {
        match self {
            Value::Scalar(s) => vec![s],
            Value::List(l) => l,
            other => {
                let text = serde_json::to_string(&other).unwrap_or_else(|_| format!("{:?}", other));
                vec![text]
            }
        }
    }
}

/// Merge `incoming` under `key` in `object`, skipping blank scalars.
pub(crate) fn merge_field(object: &mut Object, key: &str, incoming: Value) {
    if incoming.is_blank() {
        return;
    }
    let slot = object.remove(key);
    let merged = Value::merge_or_degrade(key, slot, incoming);
    object.insert(key.to_string(), merged);
}
