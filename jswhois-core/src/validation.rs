//! Pre-flight validation of query terms.

use std::net::IpAddr;
use std::time::Duration;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, instrument, trace};

use crate::error::{JswhoisError, Result};

/// Default timeout for the resolvability check (5 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Whether `query` is an IPv4 or IPv6 literal.
pub fn is_ip_literal(query: &str) -> bool {
    query.parse::<IpAddr>().is_ok()
}

/// Cheap shape check before asking the resolver.
pub fn check_hostname_syntax(query: &str) -> std::result::Result<(), &'static str> {
    let name = query.strip_suffix('.').unwrap_or(query);
    if name.is_empty() {
        return Err("empty name");
    }
    if name.len() > MAX_NAME_LEN {
        return Err("name too long");
    }
    for label in name.split('.') {
        if label.is_empty() {
            return Err("empty label");
        }
        if label.len() > MAX_LABEL_LEN {
            return Err("label too long");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err("label starts or ends with a hyphen");
        }
        let valid = label
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err("invalid character");
        }
    }
    Ok(())
}

/// Checks that a term names an IP address or a resolvable host.
#[derive(Debug, Clone)]
pub struct QueryValidator {
    timeout: Duration,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryValidator {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn create_resolver(&self) -> TokioAsyncResolver {
        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 2;

        match hickory_resolver::system_conf::read_system_conf() {
            Ok((config, mut system_opts)) => {
                system_opts.timeout = self.timeout;
                TokioAsyncResolver::tokio(config, system_opts)
            }
            Err(e) => {
                debug!(error = %e, "No usable system resolver configuration; using public resolver");
                TokioAsyncResolver::tokio(ResolverConfig::google(), opts)
            }
        }
    }

    /// Validate `query`; `force` skips every check.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn validate(&self, query: &str, force: bool) -> Result<()> {
        if force {
            return Ok(());
        }
        trace!("Validating query");

        if is_ip_literal(query) {
            return Ok(());
        }

        check_hostname_syntax(query).map_err(|reason| JswhoisError::InvalidQuery {
            query: query.to_string(),
            reason: reason.to_string(),
        })?;

        let resolver = self.create_resolver();
        resolver
            .lookup_ip(query)
            .await
            .map_err(|e| JswhoisError::InvalidQuery {
                query: query.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
