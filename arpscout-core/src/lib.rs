//! arpscout core library
//!
//! Fundamental types, error handling, cancellation, and the link-layer seams
//! shared by the arpscout crates.

pub mod cancel;
pub mod error;
pub mod interface;
pub mod types;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use error::{Error, Result};
pub use interface::{ChannelSink, ChannelSource, FrameSink, FrameSource, Interface};
pub use types::{AddressFamily, MacAddr};
