mod classifier;
mod client;
mod nameservers;
mod parser;
mod parsers;
mod referral;
mod servers;
mod subobject;
mod value;

pub use client::{Transport, WhoisClient, DEFAULT_TIMEOUT};
pub use nameservers::is_nameserver_key;
pub use parser::{parse_response, parse_with_profile, ParsedResponse, COMMENTS_KEY};
pub use referral::referral_target;
pub use servers::{get_source_profile, Format, SourceProfile, IANA_WHOIS, WHOIS_PORT};
pub use value::{Document, MergeConflict, Object, Table, Value};
