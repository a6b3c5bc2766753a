use serde::{Deserialize, Serialize};

pub mod config;
pub mod transport;

pub use config::{ConfigError, LinkConfig};
pub use transport::{ByteSource, TransportError};

/// One completed acquisition window of raw 8-bit sample codes.
///
/// Frames are produced exclusively by the demultiplexer, which only
/// materializes payloads whose declared length matches the configured frame
/// size. A frame is immutable after emission; consumers may clone and retain
/// the most recent one (e.g. for export).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleFrame {
    /// Raw unsigned 8-bit ADC codes, in acquisition order.
    pub codes: Vec<u8>,
}

impl SampleFrame {
    pub fn new(codes: Vec<u8>) -> Self {
        Self { codes }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// A typed event recovered from the shared byte channel.
///
/// The link interleaves two wire formats on one channel: printable ASCII
/// status lines and 0xAA-prefixed binary sample frames. The demultiplexer
/// emits at most one of these per inbound byte, preserving arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LinkEvent {
    /// A completed ASCII telemetry/status line (terminator stripped).
    Line(String),
    /// A completed fixed-length binary sample frame.
    Frame(SampleFrame),
}
