//! ARP reconnaissance library for arpscout
//!
//! Provides the Ethernet ARP frame codec, a passive monitor that builds a
//! registry of hosts seen replying, and an active prober that pairs a paced
//! request transmitter with a background reply listener. All session loops
//! run against the [`arpscout_core::FrameSource`] / [`arpscout_core::FrameSink`]
//! seams, so they can be exercised without raw sockets.

pub mod frame;
pub mod listener;
pub mod monitor;
pub mod probe;
pub mod targets;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types
pub use frame::{ArpFrame, ArpHeader, ArpOperation, EthernetHeader, ETHERTYPE_ARP};
pub use listener::ReplyListener;
pub use monitor::{ArpEvent, HostObservation, MonitorReport};
pub use probe::{ProbeConfig, ProbeReport};
