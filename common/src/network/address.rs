//! # Candidate Address Model
//!
//! An [`Address`] is the unit every pipeline stage passes around. It keeps the
//! exact text found in the scan file (that text is what ends up in the output)
//! next to the parsed [`IpAddr`] used for probing.

use std::fmt;
use std::net::{AddrParseError, IpAddr};
use std::str::FromStr;

use crate::network::subnet::SubnetKey;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    text: String,
    ip: IpAddr,
}

impl Address {
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn subnet_key(&self) -> SubnetKey {
        SubnetKey::from(self)
    }
}

impl FromStr for Address {
    type Err = AddrParseError;

    /// Accepts standard IPv4 dotted-quad and IPv6 literals only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ip = s.parse::<IpAddr>()?;
        Ok(Self {
            text: s.to_owned(),
            ip,
        })
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Self {
            text: ip.to_string(),
            ip,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
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
