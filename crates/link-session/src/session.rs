use core_types::{ByteSource, ConfigError, LinkConfig, LinkEvent, SampleFrame, TransportError};
use crossbeam_channel::{unbounded, Receiver, Sender};
use framing::FrameDemux;
use log::{debug, trace};
use protocol::Command;

/// Owns a byte source and a demultiplexer, turning polled bytes into typed
/// events on a channel.
pub struct LinkSession<S: ByteSource> {
    source: S,
    demux: FrameDemux,
    event_tx: Sender<LinkEvent>,
    last_frame: Option<SampleFrame>,
}

impl<S: ByteSource> LinkSession<S> {
    /// Build a session around `source`, validating the configuration before
    /// any bytes are processed. Returns the session and the receiving end of
    /// its event channel.
    pub fn open(
        source: S,
        config: &LinkConfig,
    ) -> Result<(Self, Receiver<LinkEvent>), ConfigError> {
        config.validate()?;
        let demux = FrameDemux::new(config.frame_samples)?;
        let (event_tx, event_rx) = unbounded();
        Ok((
            Self {
                source,
                demux,
                event_tx,
                last_frame: None,
            },
            event_rx,
        ))
    }

    /// Drain every byte the source can currently deliver, feeding each into
    /// the demultiplexer and dispatching completed events in arrival order.
    ///
    /// Returns the number of bytes consumed. Zero means the link was quiet;
    /// any partial line or frame simply stays pending until the next poll.
    pub fn poll(&mut self) -> Result<usize, TransportError> {
        let mut consumed = 0;
        while self.source.bytes_available()? > 0 {
            let Some(byte) = self.source.read_byte()? else {
                break;
            };
            consumed += 1;
            if let Some(event) = self.demux.feed(byte) {
                if let LinkEvent::Frame(frame) = &event {
                    trace!("frame completed: {} samples", frame.len());
                    self.last_frame = Some(frame.clone());
                }
                // A dropped receiver only means nobody is listening; the
                // session keeps the retained frame current regardless.
                let _ = self.event_tx.send(event);
            }
        }
        Ok(consumed)
    }

    /// Encode and write one command line to the device.
    pub fn send(&mut self, command: &Command) -> Result<(), TransportError> {
        let line = command.encode();
        debug!("tx: {}", line.trim_end());
        self.source.write(line.as_bytes())
    }

    /// The most recent completed frame, retained for export.
    pub fn last_frame(&self) -> Option<&SampleFrame> {
        self.last_frame.as_ref()
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
