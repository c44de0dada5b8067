//! Follows one query term along its referral chain.
//!
//! The walk starts at the root server (IANA by default), parses each reply
//! and moves on to the server the reply refers to, until there is no
//! referral, recursion is off, a server cannot be reached, or a loop or the
//! hop limit stops it.

use std::collections::HashSet;
use std::time::Duration;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::validation::QueryValidator;
use crate::whois::{
    parse_response, Document, ParsedResponse, Transport, WhoisClient, DEFAULT_TIMEOUT,
    IANA_WHOIS, WHOIS_PORT,
};

const DEFAULT_MAX_REFERRALS: usize = 10;

/// Per-run settings shared by every chain walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOptions {
    pub root_server: String,
    pub port: u16,
    pub recursive: bool,
    pub leaf_only: bool,
    pub force: bool,
    pub timeout: Duration,
    pub max_referrals: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupOptions {
    pub fn new() -> Self {
        Self {
            root_server: IANA_WHOIS.to_string(),
            port: WHOIS_PORT,
            recursive: true,
            leaf_only: false,
            force: false,
            timeout: DEFAULT_TIMEOUT,
            max_referrals: DEFAULT_MAX_REFERRALS,
        }
    }

    pub fn with_root_server(mut self, server: impl Into<String>) -> Self {
        self.root_server = server.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Follow referrals (`-R`, the default) or stop after the root (`-Q`).
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Keep only the last server's document in the result.
    pub fn leaf_only(mut self, leaf_only: bool) -> Self {
        self.leaf_only = leaf_only;
        self
    }

    /// Skip query validation.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_referrals(mut self, max_referrals: usize) -> Self {
        self.max_referrals = max_referrals;
        self
    }
}

/// Why a chain walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoneReason {
    NoReferral,
    RecursionDisabled,
    /// The last server could not be queried; its document is empty.
    Unreachable,
    ReferralLoop,
    HopLimit,
}

/// Everything learned about one query term.
///
/// Serializes as a single map: `query`, `chain`, then one entry per
/// retained server document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub query: String,
    pub chain: Vec<String>,
    /// Server documents in chain order.
    pub documents: Vec<(String, Document)>,
    pub done: DoneReason,
}

impl LookupResult {
    pub fn document(&self, server: &str) -> Option<&Document> {
        self.documents
            .iter()
            .find(|(s, _)| s == server)
            .map(|(_, doc)| doc)
    }

    /// The last server in the chain and its document.
    pub fn leaf(&self) -> Option<(&str, &Document)> {
        self.documents
            .last()
            .map(|(server, doc)| (server.as_str(), doc))
    }
}

impl Serialize for LookupResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.documents.len()))?;
        map.serialize_entry("query", &self.query)?;
        map.serialize_entry("chain", &self.chain)?;
        for (server, doc) in &self.documents {
            map.serialize_entry(server, doc)?;
        }
        map.end()
    }
}

/// Walks referral chains over a [`Transport`].
#[derive(Debug, Clone)]
pub struct ChainWalker<T = WhoisClient> {
    transport: T,
    validator: QueryValidator,
    options: LookupOptions,
}

impl ChainWalker<WhoisClient> {
    pub fn new(options: LookupOptions) -> Self {
        let transport = WhoisClient::new().with_timeout(options.timeout);
        Self::with_transport(transport, options)
    }
}

impl<T: Transport> ChainWalker<T> {
    pub fn with_transport(transport: T, options: LookupOptions) -> Self {
        Self {
            transport,
            validator: QueryValidator::new().with_timeout(options.timeout),
            options,
        }
    }

    pub fn options(&self) -> &LookupOptions {
        &self.options
    }

    /// Query one server; an unreachable server yields `None`.
    async fn ask(&self, server: &str, query: &str) -> Result<Option<ParsedResponse>> {
        debug!(server = %server, query = %query, "Looking up query at server");
        match self.transport.query(server, self.options.port, query).await {
            Ok(raw) => Ok(Some(parse_response(server, &raw))),
            Err(e) if e.is_transport() => {
                warn!(server = %server, error = %e, "Unable to query server");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Walk the chain for `query`.
    ///
    /// Fails only when the query does not validate; unreachable servers end
    /// the walk with an empty document instead.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn lookup(&self, query: &str) -> Result<LookupResult> {
        self.validator.validate(query, self.options.force).await?;
        info!("Looking up {}", query);

        let mut chain = Vec::new();
        let mut documents = Vec::new();
        let mut visited = HashSet::new();
        let mut server = self.options.root_server.clone();

        let done = loop {
            visited.insert(server.to_lowercase());
            let response = self.ask(&server, query).await?;
            chain.push(server.clone());

            let Some(ParsedResponse { document, referral }) = response else {
                documents.push((server, Document::new()));
                break DoneReason::Unreachable;
            };
            documents.push((server.clone(), document));

            if !self.options.recursive {
                break DoneReason::RecursionDisabled;
            }
            let Some(next) = referral else {
                break DoneReason::NoReferral;
            };
            if visited.contains(&next.to_lowercase()) {
                warn!(server = %server, next = %next, "Referral loop; not following");
                break DoneReason::ReferralLoop;
            }
            if chain.len() > self.options.max_referrals {
                warn!(
                    next = %next,
                    hops = self.options.max_referrals,
                    "Referral limit reached; not following"
                );
                break DoneReason::HopLimit;
            }
            server = next;
        };

        debug!(hops = chain.len(), reason = ?done, "Chain walk finished");

        if self.options.leaf_only {
            documents.drain(..documents.len().saturating_sub(1));
        }

        Ok(LookupResult {
            query: query.to_string(),
            chain,
            documents,
            done,
        })
    }
}
