//! Target address-range expansion
//!
//! Accepts a CIDR expression or a single address, IPv4 or IPv6, and expands
//! it to the usable host addresses per the family's convention: IPv4 drops
//! the network and broadcast addresses (except /31 point-to-point and /32),
//! IPv6 drops the subnet-router anycast (network) address (except /127 and
//! /128). Ranges wider than one probe session can usefully sweep are
//! refused rather than truncated.

use arpscout_core::{Error, Result};
use ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};
use std::net::IpAddr;

/// IPv4 ranges wider than this are refused; a /16 already expands to 65534
/// targets, the most one paced probe session can usefully sweep.
const MAX_IPV4_EXPANSION_PREFIX: u8 = 16;

/// IPv6 ranges wider than this are refused outright; expanding them into a
/// concrete target list is never practical.
const MAX_IPV6_EXPANSION_PREFIX: u8 = 116;

/// Parse a range expression: either plain address or CIDR notation
pub fn parse_range(expr: &str) -> Result<IpNetwork> {
    if let Ok(addr) = expr.parse::<IpAddr>() {
        let network = match addr {
            IpAddr::V4(v4) => IpNetwork::V4(
                Ipv4Network::new(v4, 32)
                    .map_err(|_| Error::InvalidAddressExpression(expr.to_string()))?,
            ),
            IpAddr::V6(v6) => IpNetwork::V6(
                Ipv6Network::new(v6, 128)
                    .map_err(|_| Error::InvalidAddressExpression(expr.to_string()))?,
            ),
        };
        return Ok(network);
    }

    expr.parse::<IpNetwork>()
        .map_err(|_| Error::InvalidAddressExpression(expr.to_string()))
}

/// Expand a range expression into its usable host addresses
pub fn expand_hosts(expr: &str) -> Result<Vec<IpAddr>> {
    match parse_range(expr)? {
        IpNetwork::V4(net) => {
            if net.prefix() < MAX_IPV4_EXPANSION_PREFIX {
                return Err(Error::InvalidAddressExpression(format!(
                    "{}: IPv4 range too large to expand",
                    expr
                )));
            }
            let hosts = if net.prefix() >= 31 {
                net.iter().map(IpAddr::V4).collect()
            } else {
                net.iter()
                    .filter(|ip| *ip != net.network() && *ip != net.broadcast())
                    .map(IpAddr::V4)
                    .collect()
            };
            Ok(hosts)
        }
        IpNetwork::V6(net) => {
            if net.prefix() < MAX_IPV6_EXPANSION_PREFIX {
                return Err(Error::InvalidAddressExpression(format!(
                    "{}: IPv6 range too large to expand",
                    expr
                )));
            }
            let hosts = if net.prefix() >= 127 {
                net.iter().map(IpAddr::V6).collect()
            } else {
                net.iter().skip(1).map(IpAddr::V6).collect()
            };
            Ok(hosts)
        }
    }
}

/// Expand a range expression into IPv4 probe targets.
///
/// ARP probing transmits IPv4 requests only, so an IPv6 expression is a
/// caller error here even though [`expand_hosts`] accepts it.
pub fn resolve_probe_targets(expr: &str) -> Result<Vec<std::net::Ipv4Addr>> {
    expand_hosts(expr)?
        .into_iter()
        .map(|ip| match ip {
            IpAddr::V4(v4) => Ok(v4),
            IpAddr::V6(_) => Err(Error::InvalidAddressExpression(format!(
                "{}: IPv6 ranges cannot be probed with IPv4 ARP requests",
                expr
            ))),
        })
        .collect()
}
