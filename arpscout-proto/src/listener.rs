//! Background ARP reply listener
//!
//! One worker thread owns its receive handle and result list for the whole
//! probe session. `stop` trips the shared flag and joins the thread, and the
//! results are moved out through the join itself, so there is no window in
//! which the caller and the worker can both touch them.

use crate::frame::{ArpFrame, ETHERTYPE_ARP};
use arpscout_core::{Error, FrameSource, MacAddr, Result};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Handle to a running reply listener
pub struct ReplyListener {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<Vec<(IpAddr, MacAddr)>>,
}

impl ReplyListener {
    /// Start the listener thread.
    ///
    /// Only reply frames whose Ethernet destination equals `filter_mac` are
    /// accepted; each one appends a (sender protocol address, sender
    /// hardware address) pair. Duplicates are kept; multiplicity is the
    /// caller's to interpret.
    pub fn spawn<S>(mut source: S, filter_mac: MacAddr) -> Self
    where
        S: FrameSource + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::spawn(move || {
            let mut responses: Vec<(IpAddr, MacAddr)> = Vec::new();

            while !stop_flag.load(Ordering::SeqCst) {
                let bytes = match source.recv() {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => continue,
                    Err(e) => {
                        warn!("reply listener receive failed: {}", e);
                        break;
                    }
                };

                let frame = match ArpFrame::decode(&bytes) {
                    Ok(frame) => frame,
                    Err(e) => {
                        debug!("discarding frame: {}", e);
                        continue;
                    }
                };

                if frame.ethernet.ethertype != ETHERTYPE_ARP
                    || !frame.is_reply()
                    || frame.ethernet.destination != filter_mac
                {
                    continue;
                }

                debug!("{} is at {}", frame.sender_ip, frame.sender_mac);
                responses.push((frame.sender_ip, frame.sender_mac));
            }

            // The receive handle is released here when `source` drops.
            responses
        });

        Self { stop, thread }
    }

    /// Signal the worker to stop, wait for it to exit, and take its results.
    ///
    /// Blocks until the loop has observed the stop signal; after this
    /// returns no further pair can be appended.
    pub fn stop(self) -> Result<Vec<(IpAddr, MacAddr)>> {
        self.stop.store(true, Ordering::SeqCst);
        self.thread
            .join()
            .map_err(|_| Error::Channel("reply listener thread panicked".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{EndlessReplySource, ScriptedSource};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn mac(last: u8) -> MacAddr {
        MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn reply_to(dest: MacAddr, sender_ip: Ipv4Addr, sender_mac: MacAddr) -> Vec<u8> {
        ArpFrame::new_reply(sender_mac, sender_ip, dest, Ipv4Addr::UNSPECIFIED).encode()
    }

    #[test]
    fn stop_immediately_after_start() {
        let listener = ReplyListener::spawn(ScriptedSource::new(vec![]), mac(0xAA));
        let responses = listener.stop().unwrap();
        assert!(responses.is_empty());
    }

    #[test]
    fn stop_races_cleanly_with_a_busy_source() {
        // The source never runs dry; stop must still return, and the vec it
        // hands over is exclusively ours afterwards.
        let listener = ReplyListener::spawn(EndlessReplySource::new(mac(0xAA)), mac(0xAA));
        std::thread::sleep(Duration::from_millis(20));
        let responses = listener.stop().unwrap();
        // Whatever was collected is a prefix of the stream; every pair is
        // well-formed.
        for (ip, _) in &responses {
            assert!(matches!(ip, IpAddr::V4(_)));
        }
    }

    #[test]
    fn filters_on_destination_hardware_address() {
        let ours = mac(0xAA);
        let frames = vec![
            reply_to(ours, Ipv4Addr::new(10, 0, 0, 1), mac(1)),
            reply_to(mac(0xBB), Ipv4Addr::new(10, 0, 0, 2), mac(2)), // someone else's
            // a request addressed to us is not a reply
            ArpFrame::new_request(mac(3), Ipv4Addr::new(10, 0, 0, 3), Ipv4Addr::new(10, 0, 0, 9))
                .encode(),
            reply_to(ours, Ipv4Addr::new(10, 0, 0, 4), mac(4)),
        ];

        let listener = ReplyListener::spawn(ScriptedSource::new(frames), ours);
        std::thread::sleep(Duration::from_millis(20));
        let responses = listener.stop().unwrap();

        assert_eq!(
            responses,
            vec![
                (IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), mac(1)),
                (IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4)), mac(4)),
            ]
        );
    }

    #[test]
    fn duplicates_are_preserved() {
        let ours = mac(0xAA);
        let frame = reply_to(ours, Ipv4Addr::new(10, 0, 0, 1), mac(1));
        let listener =
            ReplyListener::spawn(ScriptedSource::new(vec![frame.clone(), frame.clone(), frame]), ours);
        std::thread::sleep(Duration::from_millis(20));
        let responses = listener.stop().unwrap();
        assert_eq!(responses.len(), 3);
    }
}
