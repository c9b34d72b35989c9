//! Coarse subnet keys used to partition candidate addresses.
//!
//! The key is the first `.`-separated component of the address text, so
//! `10.2.3.4` lands in group `10`. This is not a prefix computation: it groups
//! IPv4 addresses by their leading octet only.
//!
//! IPv6 literals carry no `.` (outside IPv4-mapped forms), which makes the whole
//! address its own key. Every IPv6 candidate therefore forms a singleton group.

use std::fmt;

use crate::network::address::Address;

const COMPONENT_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubnetKey(String);

impl SubnetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&Address> for SubnetKey {
    fn from(addr: &Address) -> Self {
        let text = addr.as_str();
        let first = text.split(COMPONENT_SEPARATOR).next().unwrap_or(text);
        Self(first.to_owned())
    }
}

impl fmt::Display for SubnetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
