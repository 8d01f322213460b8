//! Network interface enumeration and raw frame I/O
//!
//! The session loops never touch sockets directly; they consume the
//! [`FrameSource`] and [`FrameSink`] seams so they can be driven by synthetic
//! frames in tests. The production implementations wrap a `pnet_datalink`
//! Ethernet channel opened with a short read timeout, which keeps receive
//! loops responsive to stop signals.

use crate::error::{Error, Result};
use crate::types::MacAddr;
use pnet_datalink::{Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use std::fmt;
use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

/// How long a receive poll blocks before reporting an empty read.
const RECV_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Source of raw link-layer frames.
pub trait FrameSource {
    /// Read the next frame. `Ok(None)` means nothing arrived within the poll
    /// timeout and the caller should retry; it is never an error.
    fn recv(&mut self) -> Result<Option<Vec<u8>>>;
}

/// Sink for raw link-layer frames.
pub trait FrameSink {
    fn send(&mut self, frame: &[u8]) -> Result<()>;
}

/// Network interface
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// MAC address
    pub mac: MacAddr,
    inner: NetworkInterface,
}

impl Interface {
    /// Get interface by name
    pub fn by_name(name: &str) -> Result<Self> {
        let iface = pnet_datalink::interfaces()
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))?;

        Ok(Self::from_pnet(iface))
    }

    /// List all available interfaces
    pub fn list_all() -> Vec<Self> {
        pnet_datalink::interfaces()
            .into_iter()
            .map(Self::from_pnet)
            .collect()
    }

    fn from_pnet(iface: NetworkInterface) -> Self {
        let mac = iface
            .mac
            .map(|m| MacAddr([m.0, m.1, m.2, m.3, m.4, m.5]))
            .unwrap_or_else(MacAddr::zero);

        Self {
            name: iface.name.clone(),
            index: iface.index,
            mac,
            inner: iface,
        }
    }

    /// First IPv4 address assigned to this interface, if any
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.inner.ips.iter().find_map(|ip| match ip {
            ipnetwork::IpNetwork::V4(net) => Some(net.ip()),
            ipnetwork::IpNetwork::V6(_) => None,
        })
    }

    /// Open a receive handle on this interface.
    ///
    /// Each call opens an independent channel; the handle is released when
    /// the returned value is dropped.
    pub fn open_source(&self) -> Result<ChannelSource> {
        let (_, rx) = self.open_channel()?;
        debug!("opened receive channel on {}", self.name);
        Ok(ChannelSource { rx })
    }

    /// Open a send handle on this interface, independent of any receiver.
    pub fn open_sink(&self) -> Result<ChannelSink> {
        let (tx, _) = self.open_channel()?;
        debug!("opened send channel on {}", self.name);
        Ok(ChannelSink { tx })
    }

    fn open_channel(&self) -> Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)> {
        let config = Config {
            read_timeout: Some(RECV_POLL_TIMEOUT),
            ..Default::default()
        };

        match pnet_datalink::channel(&self.inner, config) {
            Ok(Channel::Ethernet(tx, rx)) => Ok((tx, rx)),
            Ok(_) => Err(Error::Channel(format!(
                "unsupported channel type on '{}'",
                self.name
            ))),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Err(Error::Channel(format!(
                "insufficient privileges to open a raw channel on '{}': {}",
                self.name, e
            ))),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.mac)
    }
}

/// Receive half of a raw Ethernet channel
pub struct ChannelSource {
    rx: Box<dyn DataLinkReceiver>,
}

impl FrameSource for ChannelSource {
    fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        match self.rx.next() {
            Ok(frame) => Ok(Some(frame.to_vec())),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}

/// Send half of a raw Ethernet channel
pub struct ChannelSink {
    tx: Box<dyn DataLinkSender>,
}

impl FrameSink for ChannelSink {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        match self.tx.send_to(frame, None) {
            Some(Ok(())) => Ok(()),
            Some(Err(e)) => Err(Error::Io(e)),
            None => Err(Error::Channel(
                "link-layer channel refused the frame".to_string(),
            )),
        }
    }
}
