//! Active ARP prober
//!
//! One probe session walks Idle → targets resolved → transmitting (paced
//! requests) → collecting (reply timeout) → done. The reply listener is
//! started before the first transmission so fast responders are never
//! missed, and it is always stopped (and its receive handle released)
//! before an error or cancellation propagates.

use crate::frame::ArpFrame;
use crate::listener::ReplyListener;
use arpscout_core::{CancelToken, Error, FrameSink, FrameSource, MacAddr, Result};
use rand::seq::SliceRandom;
use std::net::{IpAddr, Ipv4Addr};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

/// How often the collect wait re-checks the cancellation token
const COLLECT_POLL: Duration = Duration::from_millis(50);

/// Probe session parameters
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Hardware address to transmit from (and to accept replies on)
    pub source_mac: MacAddr,
    /// Shuffle targets to avoid a sequential-scan signature
    pub shuffle: bool,
    /// Fixed delay between requests, bounding the burst rate
    pub send_interval: Duration,
    /// How long to keep listening after the last request
    pub reply_timeout: Duration,
}

impl ProbeConfig {
    pub fn new(source_mac: MacAddr) -> Self {
        Self {
            source_mac,
            shuffle: true,
            send_interval: Duration::from_millis(10),
            reply_timeout: Duration::from_secs(5),
        }
    }
}

/// Outcome of one probe session
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// (protocol address, hardware address) pairs in arrival order,
    /// duplicates preserved
    pub responses: Vec<(IpAddr, MacAddr)>,
    pub requests_sent: usize,
    pub elapsed: Duration,
}

/// Run one probe session against `targets`.
///
/// Each target gets one IPv4 request from `config.source_mac` with the
/// unspecified (0.0.0.0) source protocol address. `progress` is invoked with
/// (sent, total) after every transmission. A send failure is fatal to the
/// probe; cancellation surfaces as [`Error::Interrupted`]. On both paths the
/// listener is stopped and joined first, so no background receiver leaks.
pub fn run<T, S, P>(
    sink: &mut T,
    listener_source: S,
    mut targets: Vec<Ipv4Addr>,
    config: &ProbeConfig,
    cancel: &CancelToken,
    mut progress: P,
) -> Result<ProbeReport>
where
    T: FrameSink,
    S: FrameSource + Send + 'static,
    P: FnMut(usize, usize),
{
    if config.shuffle {
        targets.shuffle(&mut rand::thread_rng());
    }

    let started = Instant::now();
    let total = targets.len();
    info!(
        "probing {} hosts from {} (interval {:?}, timeout {:?})",
        total, config.source_mac, config.send_interval, config.reply_timeout
    );

    // The listener must be live before the first request goes out.
    let listener = ReplyListener::spawn(listener_source, config.source_mac);

    let mut sent = 0;
    for target in &targets {
        if cancel.is_cancelled() {
            listener.stop()?;
            return Err(Error::Interrupted);
        }

        let request = ArpFrame::new_request(config.source_mac, Ipv4Addr::UNSPECIFIED, *target);
        if let Err(e) = sink.send(&request.encode()) {
            if let Err(stop_err) = listener.stop() {
                tracing::warn!("listener shutdown after send failure: {}", stop_err);
            }
            return Err(e);
        }

        sent += 1;
        progress(sent, total);
        thread::sleep(config.send_interval);
    }

    // Collect: wait out the reply window, still responsive to cancellation.
    let deadline = Instant::now() + config.reply_timeout;
    loop {
        if cancel.is_cancelled() {
            listener.stop()?;
            return Err(Error::Interrupted);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(COLLECT_POLL));
    }

    let responses = listener.stop()?;
    info!("probe finished: {} responses", responses.len());

    Ok(ProbeReport {
        responses,
        requests_sent: sent,
        elapsed: started.elapsed(),
    })
}
