//! Turning raw blocklist lines into IPv4 networks.
//!
//! Rejection is an expected, high-frequency outcome here (blank lines,
//! comments, IPv6 entries, decoration), so everything in this module is a
//! quiet two-outcome filter instead of an error path.
use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net};

/// Everything after this marker in a line is a comment.
const COMMENT_MARKER: char = '#';

/// Strip the comment and surrounding whitespace from a raw blocklist line.
///
/// Returns `None` if nothing is left; an empty remainder is not a
/// candidate, not an error.
#[must_use]
pub fn clean_line(line: &str) -> Option<&str> {
    let token = match line.split_once(COMMENT_MARKER) {
        Some((before, _comment)) => before,
        None => line,
    }
    .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Interpret a cleaned token as an IPv4 network.
///
/// A bare address is treated as a /32. The parse is non-strict: host bits
/// set beyond the prefix are masked instead of rejected, so `10.0.0.1/8`
/// becomes `10.0.0.0/8`. IPv6 entries and unparseable tokens yield `None`.
#[must_use]
pub fn parse_network(token: &str) -> Option<Ipv4Net> {
    let net = token
        .parse::<IpNet>()
        .ok()
        .or_else(|| token.parse::<IpAddr>().ok().map(IpNet::from))?;
    match net {
        IpNet::V4(net) => Some(net.trunc()),
        IpNet::V6(_) => None,
    }
}

/// Clean and validate a raw line in one step.
#[must_use]
pub fn valid_network(line: &str) -> Option<Ipv4Net> {
    parse_network(clean_line(line)?)
}
