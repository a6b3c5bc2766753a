use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("IO Error: {0}")]
    Io(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Not connected")]
    NotConnected,
    #[error("Other: {0}")]
    Other(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// A non-blocking byte source/sink (serial port, replay buffer, mock).
///
/// The session polls this on a fixed cadence and feeds whatever is available
/// into the demultiplexer. Neither read call may block waiting for the
/// device: a stalled link simply yields no bytes, and the parser resumes
/// whenever bytes arrive again.
pub trait ByteSource: Send {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize, TransportError>;

    /// Read one byte if immediately available, `None` otherwise.
    fn read_byte(&mut self) -> Result<Option<u8>, TransportError>;

    /// Write bytes to the device (outbound command lines).
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;
}
