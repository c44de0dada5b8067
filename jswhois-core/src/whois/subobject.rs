//! Grouping of consecutive fields into nested objects.
//!
//! Registries separate contacts, hosts and other records with blank lines
//! or bare headings. The tracker collects those runs and attaches them to
//! the document once the run ends.

use super::nameservers::{annotate, expand_field, expand_fields};
use super::value::{merge_field, Document, Object, Value};

/// Key whose host list picks up `nsstat` / `nslastaa` / `remarks` lines.
pub const NSERVER_KEY: &str = "nserver";

/// `nsstat` / `nslastaa` / `remarks` lines gathered per host, kept with the
/// nameserver key as the server spelled it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NsAnnotations {
    key: String,
    hosts: Vec<(String, Vec<String>)>,
}

impl NsAnnotations {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn add(&mut self, key: &str, host: String, note: String) {
        self.key = key.to_string();
        match self.hosts.iter_mut().find(|(h, _)| *h == host) {
            Some((_, notes)) => notes.push(note),
            None => self.hosts.push((host, vec![note])),
        }
    }

    /// Fold the notes into the nameserver field of `object`.
    pub fn apply(self, object: &mut Object) {
        if self.hosts.is_empty() {
            return;
        }
        let existing = object.remove(&self.key);
        object.insert(self.key, annotate(existing, self.hosts));
    }
}

#[derive(Debug, Clone, Default)]
pub struct SubobjectTracker {
    /// Fields of the block currently being grouped.
    pub group: Object,
    /// Name the open block or heading will be attached under.
    pub object_name: Option<String>,
}

fn fresh(key: &str, value: Value) -> Object {
    let mut object = Object::new();
    if !value.is_blank() {
        object.insert(key.to_string(), value);
    }
    object
}

impl SubobjectTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new object under `name` and make it current.
    ///
    /// A plain value already stored under `name` moves into the new object
    /// under its own name, so later subkeys keep theirs.
    pub fn open_named(&mut self, doc: &mut Document, name: &str) {
        let value = match doc.remove(name) {
            None => Value::Object(Object::new()),
            Some(existing @ (Value::Object(_) | Value::ObjectList(_))) => {
                Value::merge_or_degrade(name, Some(existing), Value::Object(Object::new()))
            }
            Some(existing) => Value::Object(fresh(name, existing)),
        };
        doc.insert(name.to_string(), value);
        self.object_name = Some(name.to_string());
    }

    /// Add `field: value` to the object stored under `object`, or to the
    /// last object when several have accumulated there.
    pub fn add_to_object(&mut self, doc: &mut Document, object: &str, field: &str, value: String) {
        let incoming = Value::Scalar(value);
        let updated = match doc.remove(object) {
            Some(Value::Object(mut o)) => {
                merge_field(&mut o, field, incoming);
                Value::Object(o)
            }
            Some(Value::ObjectList(mut list)) => {
                match list.last_mut() {
                    Some(last) => merge_field(last, field, incoming),
                    None => list.push(fresh(field, incoming)),
                }
                Value::ObjectList(list)
            }
            Some(other) => Value::merge_or_degrade(object, Some(other), incoming),
            None => Value::Object(fresh(field, incoming)),
        };
        doc.insert(object.to_string(), updated);
    }

    /// Begin another object under `object`, turning it into an object list.
    pub fn add_new_subobject(&mut self, doc: &mut Document, object: &str, key: &str, value: String) {
        let incoming = Value::Scalar(value);
        let updated = match doc.remove(object) {
            Some(Value::Object(o)) => Value::ObjectList(vec![o, fresh(key, incoming)]),
            Some(Value::ObjectList(mut list)) => {
                list.push(fresh(key, incoming));
                Value::ObjectList(list)
            }
            Some(existing @ (Value::Scalar(_) | Value::List(_))) => {
                let merged = Value::merge_or_degrade(key, Some(existing), incoming);
                Value::ObjectList(vec![fresh(key, merged)])
            }
            Some(table @ Value::Table(_)) => {
                Value::merge_or_degrade(object, Some(table), Value::Object(fresh(key, incoming)))
            }
            None => Value::ObjectList(vec![fresh(key, incoming)]),
        };
        doc.insert(object.to_string(), updated);
    }

    /// Attach the grouped block to `doc`.
    ///
    /// A block of fewer than two keys is spliced into the document itself;
    /// larger blocks are merged under the block's name.
    pub fn close_group(&mut self, doc: &mut Document, annotations: NsAnnotations) {
        let mut group = std::mem::take(&mut self.group);
        let name = self.object_name.take();

        annotations.apply(&mut group);
        expand_fields(&mut group);

        match name {
            Some(name) if group.len() >= 2 => merge_field(doc, &name, Value::Object(group)),
            _ => {
                for (key, value) in group {
                    merge_field(doc, &key, value);
                }
            }
        }
    }
}

/// Cleanup pass run once a reply is fully consumed.
///
/// Collapses one-key objects whose key repeats the field name and expands
/// nameserver listings at the top level and one level down.
pub fn finalize(doc: Document) -> Document {
    doc.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Object(o) if o.len() == 1 && o.contains_key(&key) => {
                    o.into_values().next().unwrap_or(Value::Object(Object::new()))
                }
                Value::Object(mut o) => {
                    expand_fields(&mut o);
                    Value::Object(o)
                }
                Value::ObjectList(mut list) => {
                    list.iter_mut().for_each(expand_fields);
                    Value::ObjectList(list)
                }
                other => other,
            };
            let value = expand_field(&key, value);
            (key, value)
        })
        .collect()
}
