//! Error types for arpscout

use thiserror::Error;

/// Result type alias for arpscout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for arpscout
#[derive(Error, Debug)]
pub enum Error {
    /// Frame shorter than the field currently being read
    #[error("truncated frame: needed {needed} more bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    /// ARP hardware type other than Ethernet (1)
    #[error("unsupported hardware type: {0}")]
    UnsupportedHardwareType(u16),

    /// ARP protocol type other than IPv4 (0x0800) or IPv6 (0x86DD)
    #[error("unsupported protocol type: 0x{0:04x}")]
    UnsupportedProtocolType(u16),

    /// Address-length field inconsistent with the rest of the header
    #[error("length mismatch: {field} is {actual}, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: u8,
        actual: u8,
    },

    /// Caller-supplied address, range, or MAC string cannot be parsed
    #[error("invalid address expression: {0}")]
    InvalidAddressExpression(String),

    /// Interface not found
    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),

    /// Link-layer channel error
    #[error("channel error: {0}")]
    Channel(String),

    /// Network I/O error
    #[error("network I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// User cancellation (Ctrl+C)
    #[error("operation interrupted")]
    Interrupted,
}

impl Error {
    /// True for the per-frame decode rejections that mean "skip this frame".
    ///
    /// These never abort a receive loop; everything else is fatal to the
    /// current operation.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Error::Truncated { .. }
                | Error::UnsupportedHardwareType(_)
                | Error::UnsupportedProtocolType(_)
                | Error::LengthMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_errors_are_skippable() {
        assert!(Error::Truncated {
            needed: 14,
            available: 3
        }
        .is_frame_error());
        assert!(Error::UnsupportedHardwareType(6).is_frame_error());
        assert!(Error::UnsupportedProtocolType(0x8100).is_frame_error());
        assert!(Error::LengthMismatch {
            field: "protocol address length",
            expected: 4,
            actual: 16
        }
        .is_frame_error());
    }

    #[test]
    fn session_errors_are_fatal() {
        assert!(!Error::Interrupted.is_frame_error());
        assert!(!Error::InterfaceNotFound("eth9".to_string()).is_frame_error());
        assert!(!Error::InvalidAddressExpression("10.0.0/33".to_string()).is_frame_error());
    }
}
