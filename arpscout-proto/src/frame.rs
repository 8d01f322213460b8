//! Ethernet ARP frame structure, parsing, and generation

use arpscout_core::{AddressFamily, Error, MacAddr, Result};
use bytes::{BufMut, BytesMut};
use std::net::{IpAddr, Ipv4Addr};

/// ARP EtherType
pub const ETHERTYPE_ARP: u16 = 0x0806;

/// Hardware types
pub const HTYPE_ETHERNET: u16 = 1;

/// Ethernet header length in bytes
pub const ETHERNET_HEADER_LEN: usize = 14;
/// Fixed ARP header length in bytes
pub const ARP_HEADER_LEN: usize = 8;
/// Hardware (MAC) address length in bytes
pub const HW_ADDR_LEN: usize = 6;

/// ARP operation code.
///
/// Unknown operations are carried through decoding and ignored downstream
/// rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    /// ARP Request (1)
    Request,
    /// ARP Reply (2)
    Reply,
    /// Any other operation code
    Other(u16),
}

impl ArpOperation {
    pub fn from_u16(val: u16) -> Self {
        match val {
            1 => Self::Request,
            2 => Self::Reply,
            other => Self::Other(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            Self::Request => 1,
            Self::Reply => 2,
            Self::Other(other) => other,
        }
    }
}

/// Ethernet header. Immutable once decoded; not validated by the codec
/// because rejection happens at the ARP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType
    pub ethertype: u16,
}

/// ARP header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpHeader {
    /// Hardware type (must be 1 for Ethernet)
    pub hardware_type: u16,
    /// Protocol type (0x0800 for IPv4, 0x86DD for IPv6)
    pub protocol_type: u16,
    /// Hardware address length (must be 6)
    pub hardware_len: u8,
    /// Protocol address length (must match the protocol type's family)
    pub protocol_len: u8,
    /// Operation
    pub operation: ArpOperation,
}

/// A fully decoded Ethernet + ARP frame.
///
/// The protocol-address width is derived from [`ArpFrame::family`], never
/// stored independently; a `protocol_len` that disagrees with the family is
/// a decode failure.
#[derive(Debug, Clone)]
pub struct ArpFrame {
    pub ethernet: EthernetHeader,
    pub header: ArpHeader,
    /// Address family selected from the protocol type at decode time
    pub family: AddressFamily,
    /// Sender hardware address (SHA)
    pub sender_mac: MacAddr,
    /// Sender protocol address (SPA)
    pub sender_ip: IpAddr,
    /// Target hardware address (THA)
    pub target_mac: MacAddr,
    /// Target protocol address (TPA)
    pub target_ip: IpAddr,
}

/// Split `n` bytes off the front of `buf`, or fail with `Truncated`.
fn take<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8]> {
    if buf.len() < n {
        return Err(Error::Truncated {
            needed: n,
            available: buf.len(),
        });
    }
    let (head, rest) = buf.split_at(n);
    *buf = rest;
    Ok(head)
}

fn mac_at(bytes: &[u8]) -> MacAddr {
    let mut mac = [0u8; 6];
    mac.copy_from_slice(&bytes[..HW_ADDR_LEN]);
    MacAddr(mac)
}

impl ArpFrame {
    /// Create a new IPv4 ARP request: broadcast Ethernet destination,
    /// all-zero (unknown) target hardware address.
    pub fn new_request(source_mac: MacAddr, source_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self {
            ethernet: EthernetHeader {
                destination: MacAddr::broadcast(),
                source: source_mac,
                ethertype: ETHERTYPE_ARP,
            },
            header: ArpHeader {
                hardware_type: HTYPE_ETHERNET,
                protocol_type: AddressFamily::Ipv4.protocol_type(),
                hardware_len: HW_ADDR_LEN as u8,
                protocol_len: AddressFamily::Ipv4.addr_len() as u8,
                operation: ArpOperation::Request,
            },
            family: AddressFamily::Ipv4,
            sender_mac: source_mac,
            sender_ip: IpAddr::V4(source_ip),
            target_mac: MacAddr::zero(),
            target_ip: IpAddr::V4(target_ip),
        }
    }

    /// Create a new IPv4 ARP reply addressed to `target_mac`
    pub fn new_reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        Self {
            ethernet: EthernetHeader {
                destination: target_mac,
                source: sender_mac,
                ethertype: ETHERTYPE_ARP,
            },
            header: ArpHeader {
                hardware_type: HTYPE_ETHERNET,
                protocol_type: AddressFamily::Ipv4.protocol_type(),
                hardware_len: HW_ADDR_LEN as u8,
                protocol_len: AddressFamily::Ipv4.addr_len() as u8,
                operation: ArpOperation::Reply,
            },
            family: AddressFamily::Ipv4,
            sender_mac,
            sender_ip: IpAddr::V4(sender_ip),
            target_mac,
            target_ip: IpAddr::V4(target_ip),
        }
    }

    /// Decode an Ethernet ARP frame.
    ///
    /// Every rejection is a "skip this frame" signal
    /// ([`Error::is_frame_error`]), never a process-level fault. Steps, in
    /// order, each a possible early reject:
    /// Ethernet header (no validation), ARP header, hardware type, hardware
    /// address length, protocol-type classification, protocol address length
    /// cross-check, then the sender and target address blocks at the width
    /// the family implies.
    pub fn decode(frame: &[u8]) -> Result<Self> {
        let mut rest = frame;

        let eth = take(&mut rest, ETHERNET_HEADER_LEN)?;
        let ethernet = EthernetHeader {
            destination: mac_at(&eth[0..6]),
            source: mac_at(&eth[6..12]),
            ethertype: u16::from_be_bytes([eth[12], eth[13]]),
        };

        let hdr = take(&mut rest, ARP_HEADER_LEN)?;
        let header = ArpHeader {
            hardware_type: u16::from_be_bytes([hdr[0], hdr[1]]),
            protocol_type: u16::from_be_bytes([hdr[2], hdr[3]]),
            hardware_len: hdr[4],
            protocol_len: hdr[5],
            operation: ArpOperation::from_u16(u16::from_be_bytes([hdr[6], hdr[7]])),
        };

        if header.hardware_type != HTYPE_ETHERNET {
            return Err(Error::UnsupportedHardwareType(header.hardware_type));
        }
        if header.hardware_len as usize != HW_ADDR_LEN {
            return Err(Error::LengthMismatch {
                field: "hardware address length",
                expected: HW_ADDR_LEN as u8,
                actual: header.hardware_len,
            });
        }

        let family = AddressFamily::from_protocol_type(header.protocol_type)
            .ok_or(Error::UnsupportedProtocolType(header.protocol_type))?;
        if header.protocol_len as usize != family.addr_len() {
            return Err(Error::LengthMismatch {
                field: "protocol address length",
                expected: family.addr_len() as u8,
                actual: header.protocol_len,
            });
        }

        let block_len = HW_ADDR_LEN + family.addr_len();
        let sender = take(&mut rest, block_len)?;
        let target = take(&mut rest, block_len)?;

        Ok(Self {
            ethernet,
            header,
            family,
            sender_mac: mac_at(sender),
            sender_ip: family.addr_from_slice(&sender[HW_ADDR_LEN..])?,
            target_mac: mac_at(target),
            target_ip: family.addr_from_slice(&target[HW_ADDR_LEN..])?,
        })
    }

    /// Serialize the frame: exact field order, big-endian, no padding.
    /// 42 bytes for the IPv4 case.
    pub fn encode(&self) -> Vec<u8> {
        let len = ETHERNET_HEADER_LEN + ARP_HEADER_LEN + 2 * (HW_ADDR_LEN + self.family.addr_len());
        let mut buf = BytesMut::with_capacity(len);

        buf.put_slice(self.ethernet.destination.as_bytes());
        buf.put_slice(self.ethernet.source.as_bytes());
        buf.put_u16(self.ethernet.ethertype);

        buf.put_u16(self.header.hardware_type);
        buf.put_u16(self.header.protocol_type);
        buf.put_u8(self.header.hardware_len);
        buf.put_u8(self.header.protocol_len);
        buf.put_u16(self.header.operation.to_u16());

        buf.put_slice(self.sender_mac.as_bytes());
        put_ip(&mut buf, self.sender_ip);
        buf.put_slice(self.target_mac.as_bytes());
        put_ip(&mut buf, self.target_ip);

        buf.to_vec()
    }

    /// Check if this is a request
    pub fn is_request(&self) -> bool {
        self.header.operation == ArpOperation::Request
    }

    /// Check if this is a reply
    pub fn is_reply(&self) -> bool {
        self.header.operation == ArpOperation::Reply
    }
}

fn put_ip(buf: &mut BytesMut, ip: IpAddr) {
    match ip {
        IpAddr::V4(v4) => buf.put_slice(&v4.octets()),
        IpAddr::V6(v6) => buf.put_slice(&v6.octets()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn sample_request() -> ArpFrame {
        ArpFrame::new_request(
            MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        )
    }

    #[test]
    fn encode_decode_round_trip() {
        let frame = sample_request();
        let bytes = frame.encode();
        assert_eq!(bytes.len(), 42);

        let decoded = ArpFrame::decode(&bytes).unwrap();
        assert_eq!(decoded.ethernet, frame.ethernet);
        assert_eq!(decoded.header, frame.header);
        assert_eq!(decoded.family, AddressFamily::Ipv4);
        assert_eq!(decoded.sender_mac, frame.sender_mac);
        assert_eq!(decoded.sender_ip, frame.sender_ip);
        assert_eq!(decoded.target_mac, frame.target_mac);
        assert_eq!(decoded.target_ip, frame.target_ip);
    }

    #[test]
    fn decode_reference_request_frame() {
        // dest=ff:..:ff, src=02:00:00:00:00:01, ARP, htype=1, ptype=IPv4,
        // hlen=6, plen=4, op=1, SHA/SPA=02:00:00:00:00:01/10.0.0.1,
        // THA/TPA=00:..:00/10.0.0.2
        let mut bytes = Vec::with_capacity(42);
        bytes.extend_from_slice(&[0xff; 6]);
        bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x08, 0x06]);
        bytes.extend_from_slice(&[0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[10, 0, 0, 1]);
        bytes.extend_from_slice(&[0x00; 6]);
        bytes.extend_from_slice(&[10, 0, 0, 2]);
        assert_eq!(bytes.len(), 42);

        let frame = ArpFrame::decode(&bytes).unwrap();
        assert!(frame.is_request());
        assert_eq!(frame.family, AddressFamily::Ipv4);
        assert_eq!(frame.target_ip, "10.0.0.2".parse::<IpAddr>().unwrap());
        assert_eq!(frame.sender_ip, "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(frame.sender_mac.to_string(), "02:00:00:00:00:01");
        assert_eq!(frame.ethernet.destination, MacAddr::broadcast());
    }

    #[test]
    fn reject_non_ethernet_hardware_type() {
        let mut bytes = sample_request().encode();
        // hardware type lives at offset 14..16
        bytes[14] = 0x00;
        bytes[15] = 0x06;
        match ArpFrame::decode(&bytes) {
            Err(Error::UnsupportedHardwareType(6)) => {}
            other => panic!("expected UnsupportedHardwareType, got {:?}", other),
        }
    }

    #[test]
    fn reject_bad_hardware_len() {
        let mut bytes = sample_request().encode();
        bytes[18] = 8; // hlen
        match ArpFrame::decode(&bytes) {
            Err(Error::LengthMismatch {
                expected: 6,
                actual: 8,
                ..
            }) => {}
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn reject_unknown_protocol_type() {
        let mut bytes = sample_request().encode();
        // protocol type at offset 16..18: 0x8100 is neither IPv4 nor IPv6
        bytes[16] = 0x81;
        bytes[17] = 0x00;
        match ArpFrame::decode(&bytes) {
            Err(Error::UnsupportedProtocolType(0x8100)) => {}
            other => panic!("expected UnsupportedProtocolType, got {:?}", other),
        }
    }

    #[test]
    fn reject_protocol_len_mismatch_ipv4() {
        let mut bytes = sample_request().encode();
        bytes[19] = 16; // plen says IPv6 width but ptype says IPv4
        match ArpFrame::decode(&bytes) {
            Err(Error::LengthMismatch {
                expected: 4,
                actual: 16,
                ..
            }) => {}
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn reject_protocol_len_mismatch_ipv6() {
        let mut bytes = sample_request().encode();
        // ptype = IPv6 but plen still 4
        bytes[16] = 0x86;
        bytes[17] = 0xDD;
        match ArpFrame::decode(&bytes) {
            Err(Error::LengthMismatch {
                expected: 16,
                actual: 4,
                ..
            }) => {}
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn reject_truncated_frames() {
        let bytes = sample_request().encode();
        // Any prefix shorter than the full 42 bytes fails somewhere with
        // Truncated; probe a few cut points across all three read stages.
        for cut in [0, 5, 13, 14, 20, 21, 22, 31, 41] {
            match ArpFrame::decode(&bytes[..cut]) {
                Err(Error::Truncated { .. }) => {}
                other => panic!("cut at {}: expected Truncated, got {:?}", cut, other),
            }
        }
    }

    #[test]
    fn unknown_operation_is_carried_through() {
        let mut bytes = sample_request().encode();
        bytes[20] = 0x00;
        bytes[21] = 0x09; // RARP-ish opcode
        let frame = ArpFrame::decode(&bytes).unwrap();
        assert_eq!(frame.header.operation, ArpOperation::Other(9));
        assert!(!frame.is_request());
        assert!(!frame.is_reply());
    }

    #[test]
    fn decode_ipv6_frame() {
        let sender_ip: Ipv6Addr = "fe80::1".parse().unwrap();
        let target_ip: Ipv6Addr = "fe80::2".parse().unwrap();

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0xff; 6]);
        bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);
        bytes.extend_from_slice(&[0x08, 0x06]);
        bytes.extend_from_slice(&[0x00, 0x01, 0x86, 0xDD, 0x06, 0x10, 0x00, 0x02]);
        bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);
        bytes.extend_from_slice(&sender_ip.octets());
        bytes.extend_from_slice(&[0x00; 6]);
        bytes.extend_from_slice(&target_ip.octets());
        assert_eq!(bytes.len(), 14 + 8 + 2 * (6 + 16));

        let frame = ArpFrame::decode(&bytes).unwrap();
        assert!(frame.is_reply());
        assert_eq!(frame.family, AddressFamily::Ipv6);
        assert_eq!(frame.sender_ip, IpAddr::V6(sender_ip));
        assert_eq!(frame.target_ip, IpAddr::V6(target_ip));

        // Same frame truncated below the IPv6 sender/target width
        match ArpFrame::decode(&bytes[..40]) {
            Err(Error::Truncated { .. }) => {}
            other => panic!("expected Truncated, got {:?}", other),
        }
    }
}
