use std::net::{IpAddr, Ipv6Addr};

use colored::*;

use cleanip_common::config::Config;
use cleanip_common::network::address::Address;
use cleanip_common::network::subnet::SubnetKey;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    if is_global_unicast(ipv6_addr) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

fn is_global_unicast(ipv6_addr: &Ipv6Addr) -> bool {
    let first_byte = ipv6_addr.octets()[0];
    (0x20..=0x3F).contains(&first_byte)
}

pub fn family_to_detail(addr: &Address) -> Detail {
    let family = match addr.ip() {
        IpAddr::V4(_) => "IPv4".color(colors::IPV4_ADDR),
        IpAddr::V6(ipv6_addr) => ipv6_to_type_str(&ipv6_addr).color(colors::IPV6_ADDR),
    };
    (String::from("Family"), family)
}

pub fn subnet_to_detail(key: &SubnetKey) -> Detail {
    (String::from("Subnet"), key.as_str().color(colors::SUBNET))
}

/// Latency coloured by where it sits inside the accepted window.
pub fn latency_to_detail(latency: Option<f64>, cfg: &Config) -> Detail {
    let value = match latency {
        Some(ms) => {
            let text = format!("{ms:.2} ms");
            let middle = (cfg.low_threshold + cfg.high_threshold) / 2.0;
            if ms <= middle {
                text.green()
            } else {
                text.yellow()
            }
        }
        None => "unknown".dimmed(),
    };
    (String::from("Latency"), value)
}

pub fn selection_details(
    key: &SubnetKey,
    addr: &Address,
    latency: Option<f64>,
    cfg: &Config,
) -> Vec<Detail> {
    vec![
        subnet_to_detail(key),
        latency_to_detail(latency, cfg),
        family_to_detail(addr),
    ]
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
