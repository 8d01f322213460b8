//! In-memory frame sources and sinks for session-loop tests

use crate::frame::ArpFrame;
use arpscout_core::{CancelToken, Error, FrameSink, FrameSource, MacAddr, Result};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

/// Replays a fixed sequence of frames, then reports empty reads. Optionally
/// trips a cancellation token once the script runs dry, which lets monitor
/// tests terminate their run loop.
pub(crate) struct ScriptedSource {
    frames: VecDeque<Vec<u8>>,
    cancel_when_empty: Option<CancelToken>,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Vec<u8>>) -> Self {
        Self {
            frames: frames.into(),
            cancel_when_empty: None,
        }
    }

    pub fn cancelling_when_empty(frames: Vec<Vec<u8>>, cancel: CancelToken) -> Self {
        Self {
            frames: frames.into(),
            cancel_when_empty: Some(cancel),
        }
    }
}

impl FrameSource for ScriptedSource {
    fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None => {
                if let Some(cancel) = &self.cancel_when_empty {
                    cancel.cancel();
                }
                // Mimic a short receive poll so loops don't spin hot
                thread::sleep(Duration::from_millis(1));
                Ok(None)
            }
        }
    }
}

/// Produces a never-ending stream of reply frames addressed to `dest`,
/// for stop/join race tests.
pub(crate) struct EndlessReplySource {
    dest: MacAddr,
    counter: u8,
}

impl EndlessReplySource {
    pub fn new(dest: MacAddr) -> Self {
        Self { dest, counter: 0 }
    }
}

impl FrameSource for EndlessReplySource {
    fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        self.counter = self.counter.wrapping_add(1);
        let sender_ip = Ipv4Addr::new(10, 0, 0, self.counter);
        let sender_mac = MacAddr::new([0x02, 0x00, 0x00, 0x00, 0x00, self.counter]);
        let frame =
            ArpFrame::new_reply(sender_mac, sender_ip, self.dest, Ipv4Addr::UNSPECIFIED).encode();
        Ok(Some(frame))
    }
}

/// Records every transmitted frame
#[derive(Default)]
pub(crate) struct CapturingSink {
    pub frames: Vec<Vec<u8>>,
}

impl FrameSink for CapturingSink {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.frames.push(frame.to_vec());
        Ok(())
    }
}

/// Fails every send, for fatal-send-path tests
pub(crate) struct FailingSink;

impl FrameSink for FailingSink {
    fn send(&mut self, _frame: &[u8]) -> Result<()> {
        Err(Error::Channel("synthetic send failure".to_string()))
    }
}
