//! Turns one server's raw reply into a [`Document`].
//!
//! Lines are classified first, then handed to the line format selected by
//! the server's [`SourceProfile`]. Blank lines close blocks, end markers stop
//! the parse, and a final pass collapses and expands what was collected.

use tracing::{debug, trace};

use super::classifier::{classify, LineClass};
use super::parsers::{line_format, Step};
use super::referral::ReferralDetector;
use super::servers::{get_source_profile, SourceProfile};
use super::subobject::{finalize, NsAnnotations, SubobjectTracker, NSERVER_KEY};
use super::value::{merge_field, Document, Value};

/// Keys folded into the preceding `nserver` entry instead of the document.
const ANNOTATION_KEYS: &[&str] = &["nsstat", "nslastaa", "remarks"];

pub const COMMENTS_KEY: &str = "comments";

fn is_annotation_key(key: &str) -> bool {
    ANNOTATION_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k))
}

/// A parsed reply plus the server it refers to, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub document: Document,
    pub referral: Option<String>,
}

/// Mutable state shared by the builder and the line formats.
#[derive(Debug)]
pub struct ParseState {
    pub profile: SourceProfile,
    pub doc: Document,
    pub tracker: SubobjectTracker,
    pub previous_key: Option<String>,
    /// Set after a blank line until the next content line.
    pub new_block: bool,
    /// Open `key:` section collecting value-only lines.
    pub open_field: Option<String>,
    create_object: bool,
    pending_group_from: Option<&'static str>,
    /// Nameserver key as spelled by the server, and its latest host.
    ns_host: Option<(String, String)>,
    annotations: NsAnnotations,
    referral: ReferralDetector,
}

impl ParseState {
    pub fn new(server: &str, profile: SourceProfile) -> Self {
        let create_object = profile.create_object && profile.group_from.is_none();
        let pending_group_from = profile.group_from;
        Self {
            profile,
            doc: Document::new(),
            tracker: SubobjectTracker::new(),
            previous_key: None,
            new_block: false,
            open_field: None,
            create_object,
            pending_group_from,
            ns_host: None,
            annotations: NsAnnotations::default(),
            referral: ReferralDetector::new(server),
        }
    }

    /// Record a free-form line under `comments`.
    pub fn comment(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            merge_field(&mut self.doc, COMMENTS_KEY, Value::scalar(text));
        }
    }

    /// Note a field the format placed itself, for referral detection.
    pub fn observe(&mut self, key: &str, value: &str) {
        self.referral.observe(key, value);
    }

    /// Place a `key: value` pair in the open block or the document.
    pub fn emit(&mut self, key: String, value: Value) {
        if let Value::Scalar(text) = &value {
            self.referral.observe(&key, text);
        }

        if is_annotation_key(&key) {
            if let (Some((ns_key, host)), Value::Scalar(text)) = (&self.ns_host, &value) {
                if !text.is_empty() {
                    self.annotations.add(ns_key, host.clone(), text.clone());
                }
                self.previous_key = Some(key);
                return;
            }
        } else if key.eq_ignore_ascii_case(NSERVER_KEY) {
            self.ns_host = match &value {
                Value::Scalar(text) => text
                    .split_whitespace()
                    .next()
                    .map(|host| (key.clone(), host.to_string())),
                _ => None,
            };
        } else {
            self.ns_host = None;
        }

        if self.create_object && self.tracker.object_name.is_none() {
            self.tracker.object_name = Some(key.clone());
        }

        if !self.tracker.group.is_empty() {
            merge_field(&mut self.tracker.group, &key, value);
        } else if self.create_object && !value.is_blank() {
            self.tracker.group.insert(key.clone(), value);
        } else {
            merge_field(&mut self.doc, &key, value);
        }
        self.previous_key = Some(key);
    }

    /// Default handling of a blank line.
    ///
    /// Closes the grouped block when objects are being created; a second
    /// blank line in a row forgets the current key and object as well.
    pub fn close_block(&mut self) {
        if self.create_object {
            if !self.tracker.group.is_empty() {
                let annotations = std::mem::take(&mut self.annotations);
                self.tracker.close_group(&mut self.doc, annotations);
            }
            self.tracker.object_name = None;
            self.previous_key = None;
            self.ns_host = None;
        }
        if self.new_block {
            self.tracker.object_name = None;
            self.previous_key = None;
        }
        self.new_block = true;
    }

    fn enter_group(&mut self, content: &str) -> bool {
        let Some(marker) = self.pending_group_from else {
            return false;
        };
        if !content.trim_start().starts_with(marker) {
            return false;
        }
        debug!(marker = %marker, "Grouping fields from here on");
        self.pending_group_from = None;
        self.create_object = true;
        self.previous_key = None;
        self.tracker.object_name = Some(content.trim().trim_end_matches(':').trim().to_string());
        true
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Field(key, value) => self.emit(key, value),
            Step::Placed(key, value) => self.observe(&key, &value),
            Step::Comment(text) => self.comment(&text),
            Step::Skip => {}
        }
    }

    fn finish(mut self) -> ParsedResponse {
        std::mem::take(&mut self.annotations).apply(&mut self.doc);
        ParsedResponse {
            document: finalize(self.doc),
            referral: self.referral.finish(),
        }
    }
}

/// Parse a reply from `server` using its registered profile.
pub fn parse_response(server: &str, raw: &str) -> ParsedResponse {
    parse_with_profile(server, raw, get_source_profile(server))
}

/// Parse a reply with an explicit profile.
pub fn parse_with_profile(server: &str, raw: &str, profile: SourceProfile) -> ParsedResponse {
    let format = line_format(profile.format);
    debug!(server = %server, format = %profile.format, "Parsing WHOIS reply");

    let mut state = ParseState::new(server, profile.clone());
    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        match classify(line, &profile) {
            LineClass::Comment => continue,
            LineClass::End => {
                trace!(line = %line, "End marker; ignoring the rest of the reply");
                break;
            }
            LineClass::Commentary(text) => state.comment(text),
            LineClass::Content(content) => {
                if state.enter_group(content) {
                    state.new_block = false;
                    continue;
                }
                if content.trim().is_empty() {
                    format.blank_line(&mut state);
                    continue;
                }
                let step = format.parse_line(content, &mut state);
                state.apply(step);
                state.new_block = false;
            }
        }
    }
    format.finish(&mut state);

    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::whois::servers::Format;
    use crate::whois::value::Object;

    fn s(text: &str) -> Value {
        Value::scalar(text)
    }

    fn list(items: &[&str]) -> Value {
        Value::List(items.iter().map(|i| i.to_string()).collect())
    }

    fn object<'a>(doc: &'a Document, key: &str) -> &'a Object {
        match doc.get(key) {
            Some(Value::Object(o)) => o,
            other => panic!("expected an object under {}, got {:?}", key, other),
        }
    }

    const IANA_ORG: &str = "\
% IANA WHOIS server
% for more information on IANA, visit http://www.iana.org
% This query returned 1 object

refer:        whois.publicinterestregistry.org

domain:       ORG

organisation: Public Interest Registry (PIR)
address:      11911 Freedom Drive 10th Floor,
address:      Suite 1000
address:      Reston, VA 20190
address:      United States of America (the)

contact:      administrative
name:         Director of Operations, Compliance and Customer Support
organisation: Public Interest Registry (PIR)
e-mail:       ops@pir.org

contact:      technical
name:         Senior Director, DNS Infrastructure Group
organisation: Public Interest Registry (PIR)
e-mail:       ops@pir.org

nserver:      A0.ORG.AFILIAS-NST.INFO 199.19.56.1 2001:500:e:0:0:0:0:1
nserver:      A2.ORG.AFILIAS-NST.INFO 199.249.112.1 2001:500:40:0:0:0:0:1
ds-rdata:     26974 8 2 4fede294c53f438a158c41d39489cd78a86beb0d8a0aeaff14745c0d16e1de32

whois:        whois.publicinterestregistry.org

status:       ACTIVE
remarks:      Registration information: https://thenew.org/org-people/

created:      1985-01-01
changed:      2022-04-25
source:       IANA
";

    #[test]
    fn test_iana_reply_groups_blocks() {
        let parsed = parse_response("whois.iana.org", IANA_ORG);
        let doc = &parsed.document;

        assert_eq!(parsed.referral.as_deref(), Some("whois.publicinterestregistry.org"));
        assert_eq!(doc["refer"], s("whois.publicinterestregistry.org"));
        assert_eq!(doc["domain"], s("ORG"));
        assert_eq!(doc["whois"], s("whois.publicinterestregistry.org"));

        let org = object(doc, "organisation");
        assert_eq!(org["organisation"], s("Public Interest Registry (PIR)"));
        assert_eq!(
            org["address"],
            list(&[
                "11911 Freedom Drive 10th Floor,",
                "Suite 1000",
                "Reston, VA 20190",
                "United States of America (the)",
            ])
        );

        let Value::ObjectList(contacts) = &doc["contact"] else {
            panic!("expected contacts to be an object list");
        };
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0]["contact"], s("administrative"));
        assert_eq!(contacts[1]["contact"], s("technical"));
        assert_eq!(contacts[1]["e-mail"], s("ops@pir.org"));

        let Value::Object(ns) = &doc["nserver"] else {
            panic!("expected the nameserver block to be an object");
        };
        let Value::Table(table) = &ns["nserver"] else {
            panic!("expected a nameserver table");
        };
        assert_eq!(
            table["A0.ORG.AFILIAS-NST.INFO"],
            vec!["199.19.56.1".to_string(), "2001:500:e:0:0:0:0:1".to_string()]
        );

        let status = object(doc, "status");
        assert_eq!(status["status"], s("ACTIVE"));
        assert!(!doc.contains_key("comments"));
    }

    #[test]
    fn test_strict_reply_with_end_marker() {
        let raw = "\
Domain Name: NETMEISTER.ORG\r
Registrar WHOIS Server: whois.gandi.net\r
Registrar URL: http://www.gandi.net\r
Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r
Domain Status: ok https://icann.org/epp#ok\r
Name Server: NS1.NETMEISTER.ORG\r
Name Server: NS2.NETMEISTER.ORG\r
DNSSEC: unsigned\r
>>> Last update of WHOIS database: 2024-01-01T00:00:00Z <<<\r
\r
Terms of Use: Access to Public Interest Registry WHOIS information\r
";
        let parsed = parse_response("whois.publicinterestregistry.org", raw);
        let doc = &parsed.document;

        assert_eq!(parsed.referral.as_deref(), Some("whois.gandi.net"));
        assert_eq!(doc["Domain Name"], s("NETMEISTER.ORG"));
        assert_eq!(doc["Registrar URL"], s("http://www.gandi.net"));
        assert_eq!(doc["Domain Status"].clone().into_texts().len(), 2);
        assert_eq!(
            doc["Name Server"],
            list(&["NS1.NETMEISTER.ORG", "NS2.NETMEISTER.ORG"])
        );
        assert!(!doc.contains_key("Terms of Use"));
    }

    #[test]
    fn test_registry_echoing_itself_is_not_a_referral() {
        let raw = "Domain Name: EXAMPLE.COM\nRegistrar WHOIS Server: whois.gandi.net\n";
        let parsed = parse_response("whois.gandi.net", raw);
        assert_eq!(parsed.referral, None);
    }

    #[test]
    fn test_dotted_keys_and_values_are_trimmed() {
        let raw = "Domain Name.........: example.com\nStatus.....: ...active\n";
        let doc = parse_response("whois.example.net", raw).document;
        assert_eq!(doc["Domain Name"], s("example.com"));
        assert_eq!(doc["Status"], s("active"));
    }

    #[test]
    fn test_empty_reply_is_empty_document() {
        let parsed = parse_response("whois.example.net", "");
        assert!(parsed.document.is_empty());
        assert_eq!(parsed.referral, None);
    }

    #[test]
    fn test_unmatched_lines_become_comments() {
        let raw = "Welcome to the registry\nDomain: example.net\n";
        let doc = parse_response("whois.example.net", raw).document;
        assert_eq!(doc["comments"], s("Welcome to the registry"));
        assert_eq!(doc["Domain"], s("example.net"));
    }

    #[test]
    fn test_commentary_lines_are_kept() {
        let raw = "Domain: example.net\nRecord expires on 2030-01-01\n";
        let doc = parse_response("whois.example.net", raw).document;
        assert_eq!(doc["comments"], s("Record expires on 2030-01-01"));
    }

    #[test]
    fn test_two_column_continuation() {
        let profile = SourceProfile {
            two_column: true,
            ..SourceProfile::default()
        };
        let raw = "Address: Line one\n  Line two\n";
        let doc = parse_with_profile("whois.example.net", raw, profile).document;
        assert_eq!(doc["Address"], list(&["Line one", "Line two"]));
    }

    #[test]
    fn test_nserver_annotations_form_table() {
        let raw = "\
domain:      example.com.br
owner:       Example Ltda

nserver:     a.dns.br
nsstat:      20240101 AA
nslastaa:    20240101
nserver:     b.dns.br
nsstat:      20240101 AA
created:     20000101
";
        let doc = parse_response("whois.registro.br", raw).document;
        let block = object(&doc, "nserver");
        let Value::Table(table) = &block["nserver"] else {
            panic!("expected a nameserver table, got {:?}", block["nserver"]);
        };
        assert_eq!(
            table["a.dns.br"],
            vec!["20240101 AA".to_string(), "20240101".to_string()]
        );
        assert_eq!(table["b.dns.br"], vec!["20240101 AA".to_string()]);
        assert!(!block.contains_key("nsstat"));
        assert_eq!(block["created"], s("20000101"));

        let domain = object(&doc, "domain");
        assert_eq!(domain["owner"], s("Example Ltda"));
    }

    #[test]
    fn test_group_from_marker() {
        let raw = "\
Domain name.........: example.tn
Registrar...........: Example Registrar

Details:
Name................: Example Owner
Address.............: 1 Example Street

Administrative contact
Name................: Example Admin
";
        let doc = parse_response("whois.ati.tn", raw).document;
        assert_eq!(doc["Domain name"], s("example.tn"));
        assert_eq!(doc["Registrar"], s("Example Registrar"));
        let details = object(&doc, "Details");
        assert_eq!(details["Name"], s("Example Owner"));
        assert_eq!(details["Address"], s("1 Example Street"));
    }

    #[test]
    fn test_strip_and_literal_prefix_profile() {
        let profile = get_source_profile("whois.nic.net.sa");
        assert_eq!(profile.format, Format::Multiline);
        let raw = "*Domain Name: example.sa\n";
        let doc = parse_with_profile("whois.nic.net.sa", raw, profile).document;
        assert_eq!(doc["*Domain Name"], s("example.sa"));
    }

    #[test]
    fn test_nserver_annotations_keep_key_spelling() {
        let raw = "NSERVER: a.dns.br\nnsstat: 1\nNSERVER: b.dns.br\n";
        let doc = parse_response("whois.registro.br", raw).document;

        assert_eq!(doc.len(), 1, "{:?}", doc);
        let Value::Table(table) = &doc["NSERVER"] else {
            panic!("expected a nameserver table, got {:?}", doc["NSERVER"]);
        };
        assert_eq!(table["a.dns.br"], vec!["1".to_string()]);
        assert!(table["b.dns.br"].is_empty());
    }

    #[test]
    fn test_two_blank_lines_forget_previous_key() {
        let profile = SourceProfile {
            two_column: true,
            ..SourceProfile::default()
        };
        let raw = "Address: Line one\n\n  Line two\n\n\n  Orphan line\n";
        let doc = parse_with_profile("whois.example.net", raw, profile).document;
        assert_eq!(doc["Address"], list(&["Line one", "Line two"]));
        assert_eq!(doc["comments"], s("Orphan line"));
    }

    #[test]
    fn test_ignore_end_parses_past_marker() {
        let raw = "\
Domain Name: EXAMPLE.EDU
>>> Last update of WHOIS database <<<
Registrant:
    Example University
";
        let profile = get_source_profile("whois.educause.edu");
        assert!(profile.ignore_end);
        let doc = parse_with_profile("whois.educause.edu", raw, profile).document;
        assert_eq!(doc["Domain Name"], s("EXAMPLE.EDU"));
        assert_eq!(doc["Registrant"], s("Example University"));
        assert_eq!(doc["comments"], s(">>> Last update of WHOIS database <<<"));

        let stopping = SourceProfile {
            format: Format::Multiline,
            ..SourceProfile::default()
        };
        let doc = parse_with_profile("whois.example.edu", raw, stopping).document;
        assert_eq!(doc["Domain Name"], s("EXAMPLE.EDU"));
        assert!(!doc.contains_key("Registrant"));
    }
}
