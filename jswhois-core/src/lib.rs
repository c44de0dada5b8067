//! WHOIS lookups across referral chains, with every server's free-form
//! reply normalized into one JSON document.

pub mod bulk;
pub mod chain;
pub mod error;
pub mod output;
pub mod validation;
pub mod whois;

pub use error::{JswhoisError, Result};
pub use validation::{check_hostname_syntax, is_ip_literal, QueryValidator};

pub use bulk::{BulkExecutor, BulkResult};
pub use chain::{ChainWalker, DoneReason, LookupOptions, LookupResult};
pub use output::{JsonFormatter, OutputFormatter};
pub use whois::{
    parse_response, Document, Format, SourceProfile, Transport, Value, WhoisClient,
};
