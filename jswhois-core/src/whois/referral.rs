use once_cell::sync::Lazy;
use regex::Regex;

/// Field names whose value points at a more specific WHOIS server.
const REFERRAL_KEYS: &[&str] = &["whois", "refer", "registrar whois server"];

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://([^/\s]+)(/\S*)?$").expect("Invalid referral URL regex"));

pub fn is_referral_key(key: &str) -> bool {
    REFERRAL_KEYS.iter().any(|k| key.eq_ignore_ascii_case(k))
}

/// The server named by a referral value; URLs are reduced to their host.
pub fn referral_target(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match URL_PATTERN.captures(value).and_then(|caps| caps.get(1)) {
        Some(host) => Some(host.as_str().to_string()),
        None => Some(value.to_string()),
    }
}

/// Tracks the referral candidate while one server's reply is parsed.
#[derive(Debug, Clone)]
pub struct ReferralDetector {
    server: String,
    candidate: Option<String>,
}

impl ReferralDetector {
    pub fn new(server: &str) -> Self {
        Self {
            server: server.to_string(),
            candidate: None,
        }
    }

    /// Inspect a parsed field; the last referral naming another server wins.
    pub fn observe(&mut self, key: &str, value: &str) {
        if !is_referral_key(key) {
            return;
        }
        if let Some(target) = referral_target(value) {
            if !target.eq_ignore_ascii_case(&self.server) {
                self.candidate = Some(target);
            }
        }
    }

    pub fn finish(self) -> Option<String> {
        self.candidate
    }
}
