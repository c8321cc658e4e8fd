//! Syntactic validation for domain names and IPv4 addresses.
//!
//! Both checks are pure: malformed input yields `false`, never an error.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a domain name in its textual form.
const MAX_DOMAIN_LEN: usize = 253;

/// Labels of 1-63 alphanumerics or hyphens, never starting or ending with a
/// hyphen. At least two labels; the last one is 2-63 characters and ends in
/// a letter.
const DOMAIN_PATTERN: &str = r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9][A-Za-z0-9-]{0,61}[A-Za-z]$";

/// Dotted quad with each octet in 0-255. Leading zeros are accepted
/// (`007.0.0.1` matches).
const IPV4_PATTERN: &str = r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";

static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();
static IPV4_RE: OnceLock<Regex> = OnceLock::new();

/// Returns true if `s` is a well-formed DNS domain name.
pub fn is_valid_domain(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_DOMAIN_LEN {
        return false;
    }
    DOMAIN_RE
        .get_or_init(|| Regex::new(DOMAIN_PATTERN).expect("domain pattern compiles"))
        .is_match(s)
}

/// Returns true if `s` is a dotted-quad IPv4 address.
pub fn is_valid_ipv4(s: &str) -> bool {
    IPV4_RE
        .get_or_init(|| Regex::new(IPV4_PATTERN).expect("ipv4 pattern compiles"))
        .is_match(s)
}
