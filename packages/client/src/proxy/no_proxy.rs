//! `NO_PROXY` bypass rules
//!
//! Entries are comma-separated. `*` matches every host, IP literals match
//! exactly, `a.b.c.d/n` and `x::/n` match CIDR ranges, and anything else is a
//! domain that matches itself and all of its subdomains (`example.com` and
//! `.example.com` are equivalent).

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoProxy {
    entries: Vec<String>,
}

impl NoProxy {
    /// Returns `None` when the list holds no entries.
    #[must_use]
    pub fn from_string(no_proxy_list: &str) -> Option<Self> {
        let entries: Vec<String> = no_proxy_list
            .split(',')
            .map(|entry| entry.trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();

        if entries.is_empty() {
            None
        } else {
            Some(NoProxy { entries })
        }
    }

    /// Check if a host should bypass the proxy.
    #[must_use]
    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase();
        let host_ip = host.parse::<IpAddr>().ok();

        self.entries.iter().any(|pattern| {
            if pattern == "*" {
                return true;
            }

            if let Some((network, prefix_len)) = parse_cidr_pattern(pattern) {
                return host_ip.is_some_and(|ip| ip_in_subnet(ip, network, prefix_len));
            }

            if let Ok(pattern_ip) = pattern.parse::<IpAddr>() {
                return host_ip == Some(pattern_ip);
            }

            let domain = pattern.trim_start_matches('.');
            host == domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

fn parse_cidr_pattern(pattern: &str) -> Option<(IpAddr, u8)> {
    let (network, prefix) = pattern.split_once('/')?;
    let network = network.parse::<IpAddr>().ok()?;
    let prefix_len = prefix.parse::<u8>().ok()?;

    let max_prefix = match network {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };

    (prefix_len <= max_prefix).then_some((network, prefix_len))
}

fn ip_in_subnet(ip: IpAddr, network: IpAddr, prefix_len: u8) -> bool {
    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => ipv4_in_subnet(ip, net, prefix_len),
        (IpAddr::V6(ip), IpAddr::V6(net)) => ipv6_in_subnet(ip, net, prefix_len),
        _ => false,
    }
}

fn ipv4_in_subnet(ip: Ipv4Addr, network: Ipv4Addr, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    let mask = u32::MAX << (32 - u32::from(prefix_len));
    (u32::from(ip) & mask) == (u32::from(network) & mask)
}

fn ipv6_in_subnet(ip: Ipv6Addr, network: Ipv6Addr, prefix_len: u8) -> bool {
    if prefix_len == 0 {
        return true;
    }
    let mask = u128::MAX << (128 - u32::from(prefix_len));
    (u128::from(ip) & mask) == (u128::from(network) & mask)
}
