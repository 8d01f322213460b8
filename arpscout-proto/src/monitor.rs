//! Passive ARP monitor
//!
//! Reads frames continuously, classifies them by operation code, and
//! accumulates a registry of hosts seen replying. The registry is owned by
//! the run loop and returned to the caller when the session is cancelled;
//! nothing outlives the session.

use crate::frame::{ArpFrame, ArpOperation, ETHERTYPE_ARP};
use arpscout_core::{AddressFamily, CancelToken, FrameSource, MacAddr, Result};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::debug;

/// One host seen replying during a monitor session.
///
/// Keyed by sender protocol address in [`MonitorReport::hosts`]; repeated
/// replies update in place (count increments, timestamp refreshes, hardware
/// address last-writer-wins).
#[derive(Debug, Clone)]
pub struct HostObservation {
    pub mac: MacAddr,
    pub count: u64,
    pub last_seen: Instant,
}

/// Final snapshot of a monitor session
#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub hosts: HashMap<IpAddr, HostObservation>,
    pub elapsed: Duration,
}

/// A classified ARP observation, emitted live for rendering
#[derive(Debug, Clone)]
pub enum ArpEvent {
    /// Operation 1: who-has
    Request {
        source: MacAddr,
        destination: MacAddr,
        requested: IpAddr,
        family: AddressFamily,
    },
    /// Operation 2: is-at
    Reply {
        source: MacAddr,
        destination: MacAddr,
        sender_ip: IpAddr,
        sender_mac: MacAddr,
        family: AddressFamily,
    },
}

impl fmt::Display for ArpEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArpEvent::Request {
                source,
                destination,
                requested,
                family,
            } => write!(
                f,
                "[request] {} -> {} : who has {} ({})?",
                source, destination, requested, family
            ),
            ArpEvent::Reply {
                source,
                destination,
                sender_ip,
                sender_mac,
                family,
            } => write!(
                f,
                "[reply]   {} -> {} : {} is at {} ({})",
                source, destination, sender_ip, sender_mac, family
            ),
        }
    }
}

/// Run the monitor loop until `cancel` trips.
///
/// Decode failures are skipped silently (debug trace only); empty reads are
/// retried. The caller owns the receive handle and releases it by dropping
/// `source` after this returns.
pub fn run<S, F>(source: &mut S, cancel: &CancelToken, mut on_event: F) -> Result<MonitorReport>
where
    S: FrameSource,
    F: FnMut(&ArpEvent),
{
    let started = Instant::now();
    let mut hosts: HashMap<IpAddr, HostObservation> = HashMap::new();

    while !cancel.is_cancelled() {
        let bytes = match source.recv()? {
            Some(bytes) => bytes,
            None => continue,
        };

        let frame = match ArpFrame::decode(&bytes) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("discarding frame: {}", e);
                continue;
            }
        };
        if frame.ethernet.ethertype != ETHERTYPE_ARP {
            continue;
        }

        match frame.header.operation {
            ArpOperation::Request => on_event(&ArpEvent::Request {
                source: frame.ethernet.source,
                destination: frame.ethernet.destination,
                requested: frame.target_ip,
                family: frame.family,
            }),
            ArpOperation::Reply => {
                on_event(&ArpEvent::Reply {
                    source: frame.ethernet.source,
                    destination: frame.ethernet.destination,
                    sender_ip: frame.sender_ip,
                    sender_mac: frame.sender_mac,
                    family: frame.family,
                });

                let entry = hosts.entry(frame.sender_ip).or_insert(HostObservation {
                    mac: frame.sender_mac,
                    count: 0,
                    last_seen: started,
                });
                entry.mac = frame.sender_mac;
                entry.count += 1;
                entry.last_seen = Instant::now();
            }
            ArpOperation::Other(op) => {
                debug!("ignoring ARP operation {}", op);
            }
        }
    }

    Ok(MonitorReport {
        hosts,
        elapsed: started.elapsed(),
    })
}
