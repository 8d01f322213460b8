//! Common types used throughout arpscout

use crate::error::{Error, Result};
use rand::Rng;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// MAC Address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Broadcast MAC address (ff:ff:ff:ff:ff:ff)
    pub const fn broadcast() -> Self {
        Self([0xff, 0xff, 0xff, 0xff, 0xff, 0xff])
    }

    /// Zero MAC address (00:00:00:00:00:00)
    pub const fn zero() -> Self {
        Self([0x00, 0x00, 0x00, 0x00, 0x00, 0x00])
    }

    /// Generate a random locally-administered unicast MAC address
    pub fn random() -> Self {
        let mut bytes: [u8; 6] = rand::thread_rng().gen();
        // Clear the multicast bit, set the locally-administered bit
        bytes[0] = (bytes[0] & 0xfe) | 0x02;
        Self(bytes)
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Check if this is the broadcast address
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff; 6]
    }

    /// Check if this is a multicast address (bit 0 of first octet is 1)
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(Error::InvalidAddressExpression(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| Error::InvalidAddressExpression(s.to_string()))?;
        }

        Ok(MacAddr(bytes))
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }
}

/// Address family of the protocol address carried in an ARP frame.
///
/// Selected once when the ARP header is classified and threaded through the
/// rest of decoding; it fixes the protocol-address width and the byte to
/// [`IpAddr`] conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Classify an EtherType-style ARP protocol-type value
    pub fn from_protocol_type(ptype: u16) -> Option<Self> {
        match ptype {
            0x0800 => Some(Self::Ipv4),
            0x86DD => Some(Self::Ipv6),
            _ => None,
        }
    }

    /// The protocol-type value this family is carried as
    pub const fn protocol_type(self) -> u16 {
        match self {
            Self::Ipv4 => 0x0800,
            Self::Ipv6 => 0x86DD,
        }
    }

    /// Fixed protocol-address width in bytes (4 or 16)
    pub const fn addr_len(self) -> usize {
        match self {
            Self::Ipv4 => 4,
            Self::Ipv6 => 16,
        }
    }

    /// IP version number (4 or 6)
    pub const fn ip_version(self) -> u8 {
        match self {
            Self::Ipv4 => 4,
            Self::Ipv6 => 6,
        }
    }

    /// Convert an exactly-sized byte slice into an address of this family
    pub fn addr_from_slice(self, bytes: &[u8]) -> Result<IpAddr> {
        match self {
            Self::Ipv4 => <[u8; 4]>::try_from(bytes)
                .map(|octets| IpAddr::V4(Ipv4Addr::from(octets)))
                .map_err(|_| Error::Truncated {
                    needed: 4,
                    available: bytes.len(),
                }),
            Self::Ipv6 => <[u8; 16]>::try_from(bytes)
                .map(|octets| IpAddr::V6(Ipv6Addr::from(octets)))
                .map_err(|_| Error::Truncated {
                    needed: 16,
                    available: bytes.len(),
                }),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IPv{}", self.ip_version())
    }
}
