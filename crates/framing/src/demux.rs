use core_types::{ConfigError, LinkEvent, SampleFrame};

/// Marks the start of a binary sample frame. Outside the printable ASCII
/// range 0x20-0x7E, so it can never legitimately appear mid-line.
pub const SENTINEL: u8 = 0xAA;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Parser position within the interleaved stream.
///
/// The data-accumulation state carries its own remaining count and buffer so
/// that invalid combinations (payload bytes without a pending length) are
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParserState {
    /// Between records: accumulating printable line bytes, watching for the
    /// frame sentinel.
    Idle,
    /// Sentinel seen; the next byte declares the payload length.
    Len,
    /// Collecting a frame payload.
    Data { remaining: usize, buffer: Vec<u8> },
}

/// Splits one shared byte channel into `Line` and `Frame` events.
///
/// Feeding one byte at a time is observably identical to feeding the same
/// bytes in one batch: [`FrameDemux::push`] is defined as the fold of
/// [`FrameDemux::feed`]. Parser state survives across calls, so a record
/// split at any boundary resumes transparently when more bytes arrive.
///
/// There is no checksum and no timeout. A corrupted length byte discards the
/// frame attempt and resynchronization happens at the next sentinel; a stream
/// that stops mid-frame leaves the parser parked in `Len` or `Data` until
/// more bytes arrive, however much later that is.
pub struct FrameDemux {
    frame_samples: usize,
    state: ParserState,
    line_buf: String,
}

impl FrameDemux {
    /// Create a demultiplexer expecting `frame_samples` codes per frame.
    ///
    /// Fails fast on a frame size of zero or one that can never fit the
    /// one-byte length field.
    pub fn new(frame_samples: usize) -> Result<Self, ConfigError> {
        if frame_samples == 0 || frame_samples > u8::MAX as usize {
            return Err(ConfigError::BadFrameSamples(frame_samples));
        }
        Ok(Self {
            frame_samples,
            state: ParserState::Idle,
            line_buf: String::new(),
        })
    }

    /// Consume one inbound byte, returning at most one completed event.
    pub fn feed(&mut self, byte: u8) -> Option<LinkEvent> {
        match &mut self.state {
            ParserState::Idle => match byte {
                SENTINEL => {
                    // A frame start interrupts any unterminated line; the
                    // partial content is dropped silently.
                    self.line_buf.clear();
                    self.state = ParserState::Len;
                    None
                }
                CR | LF => {
                    if self.line_buf.is_empty() {
                        None
                    } else {
                        Some(LinkEvent::Line(std::mem::take(&mut self.line_buf)))
                    }
                }
                0x20..=0x7E => {
                    self.line_buf.push(byte as char);
                    None
                }
                // Non-printable, non-terminator noise between records.
                _ => None,
            },
            ParserState::Len => {
                if byte as usize == self.frame_samples {
                    self.state = ParserState::Data {
                        remaining: self.frame_samples,
                        buffer: Vec::with_capacity(self.frame_samples),
                    };
                } else {
                    // Length disagrees with the configured frame size:
                    // protocol mismatch, frame rejected, no payload consumed.
                    self.state = ParserState::Idle;
                }
                None
            }
            ParserState::Data { remaining, buffer } => {
                buffer.push(byte);
                if buffer.len() == *remaining {
                    let codes = std::mem::take(buffer);
                    self.state = ParserState::Idle;
                    Some(LinkEvent::Frame(SampleFrame::new(codes)))
                } else {
                    None
                }
            }
        }
    }

    /// Consume a chunk of bytes, returning every completed event in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<LinkEvent> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    /// Current parser position (for diagnostics and tests).
    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Length of the in-progress, unterminated line.
    pub fn pending_line_len(&self) -> usize {
        self.line_buf.len()
    }

    /// Drop any partial line or frame and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = ParserState::Idle;
        self.line_buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_SAMPLES: usize = 16;

    fn demux() -> FrameDemux {
        FrameDemux::new(FRAME_SAMPLES).unwrap()
    }

    fn frame_bytes(payload: &[u8]) -> Vec<u8> {
        let mut bytes = vec![SENTINEL, payload.len() as u8];
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_zero_frame_samples_rejected() {
        assert!(FrameDemux::new(0).is_err());
    }

    #[test]
    fn test_oversized_frame_samples_rejected() {
        assert!(FrameDemux::new(256).is_err());
        assert!(FrameDemux::new(255).is_ok());
    }

    #[test]
    fn test_line_terminated_by_lf() {
        let mut d = demux();
        let events = d.push(b"READY\n");
        assert_eq!(events, vec![LinkEvent::Line("READY".into())]);
    }

    #[test]
    fn test_line_terminated_by_cr() {
        let mut d = demux();
        let events = d.push(b"READY\r");
        assert_eq!(events, vec![LinkEvent::Line("READY".into())]);
    }

    #[test]
    fn test_crlf_emits_single_line() {
        // The LF after CR finds an empty buffer and emits nothing.
        let mut d = demux();
        let events = d.push(b"R_GND:470\r\n");
        assert_eq!(events, vec![LinkEvent::Line("R_GND:470".into())]);
    }

    #[test]
    fn test_partial_line_retained_without_terminator() {
        let mut d = demux();
        assert!(d.push(b"REA").is_empty());
        assert_eq!(d.pending_line_len(), 3);

        // Terminator arrives much later; line completes intact.
        let events = d.push(b"DY\n");
        assert_eq!(events, vec![LinkEvent::Line("READY".into())]);
        assert_eq!(d.pending_line_len(), 0);
    }

    #[test]
    fn test_non_printable_bytes_ignored_between_records() {
        let mut d = demux();
        let events = d.push(&[0x00, 0x07, b'O', b'K', 0x01, b'\n']);
        assert_eq!(events, vec![LinkEvent::Line("OK".into())]);
    }

    #[test]
    fn test_frame_roundtrip() {
        let mut d = demux();
        let payload: Vec<u8> = (0..FRAME_SAMPLES as u8).collect();
        let events = d.push(&frame_bytes(&payload));
        assert_eq!(
            events,
            vec![LinkEvent::Frame(SampleFrame::new(payload))]
        );
        assert_eq!(*d.state(), ParserState::Idle);
    }

    #[test]
    fn test_wrong_length_rejected_without_consuming_payload() {
        let mut d = demux();
        assert!(d.push(&[SENTINEL, 17]).is_empty());
        // Back to Idle immediately after the length byte: the following
        // bytes are treated as line content, not payload.
        assert_eq!(*d.state(), ParserState::Idle);
        let events = d.push(b"OK\n");
        assert_eq!(events, vec![LinkEvent::Line("OK".into())]);
    }

    #[test]
    fn test_sentinel_discards_unterminated_line() {
        let mut d = demux();
        assert!(d.push(b"DBG_partial").is_empty());

        let payload = vec![0x55; FRAME_SAMPLES];
        let events = d.push(&frame_bytes(&payload));
        assert_eq!(events, vec![LinkEvent::Frame(SampleFrame::new(payload))]);

        // The interrupted line is gone; a fresh line starts clean.
        let events = d.push(b"READY\n");
        assert_eq!(events, vec![LinkEvent::Line("READY".into())]);
    }

    #[test]
    fn test_sentinel_outside_printable_range() {
        // The invariant that makes interruption unambiguous.
        assert!(!(0x20..=0x7E).contains(&SENTINEL));
    }

    #[test]
    fn test_payload_may_contain_sentinel_and_terminators() {
        // Inside Data, every byte value is payload; 0xAA, CR and LF have no
        // special meaning.
        let mut d = demux();
        let mut payload = vec![SENTINEL, CR, LF, 0x00];
        payload.resize(FRAME_SAMPLES, SENTINEL);
        let events = d.push(&frame_bytes(&payload));
        assert_eq!(events, vec![LinkEvent::Frame(SampleFrame::new(payload))]);
    }

    #[test]
    fn test_partial_frame_resumes_across_pushes() {
        let mut d = demux();
        let payload: Vec<u8> = (100..100 + FRAME_SAMPLES as u8).collect();
        let bytes = frame_bytes(&payload);

        // Stop mid-payload: parser parks in Data with no deadline.
        assert!(d.push(&bytes[..10]).is_empty());
        assert!(matches!(d.state(), ParserState::Data { .. }));

        // Remaining bytes arrive later; the frame completes as if the
        // stream had never paused.
        let events = d.push(&bytes[10..]);
        assert_eq!(events, vec![LinkEvent::Frame(SampleFrame::new(payload))]);
    }

    #[test]
    fn test_stall_in_len_state_is_resumable() {
        let mut d = demux();
        assert!(d.push(&[SENTINEL]).is_empty());
        assert_eq!(*d.state(), ParserState::Len);

        // Nothing arrives for a while; the next byte is still the length.
        let payload = vec![1; FRAME_SAMPLES];
        let mut rest = vec![FRAME_SAMPLES as u8];
        rest.extend_from_slice(&payload);
        let events = d.push(&rest);
        assert_eq!(events, vec![LinkEvent::Frame(SampleFrame::new(payload))]);
    }

    #[test]
    fn test_interleaved_lines_and_frames_preserve_order() {
        let mut d = demux();
        let payload = vec![0x42; FRAME_SAMPLES];

        let mut stream = Vec::new();
        stream.extend_from_slice(b"READY\r\n");
        stream.extend_from_slice(&frame_bytes(&payload));
        stream.extend_from_slice(b"C_uF:0.472\n");
        stream.extend_from_slice(&frame_bytes(&payload));

        let events = d.push(&stream);
        assert_eq!(
            events,
            vec![
                LinkEvent::Line("READY".into()),
                LinkEvent::Frame(SampleFrame::new(payload.clone())),
                LinkEvent::Line("C_uF:0.472".into()),
                LinkEvent::Frame(SampleFrame::new(payload)),
            ]
        );
    }

    #[test]
    fn test_incremental_feed_equivalence() {
        // Feeding one byte at a time must produce the same ordered events as
        // one batch, for a stream exercising every state transition.
        let payload: Vec<u8> = (0..FRAME_SAMPLES as u8).collect();
        let mut stream = Vec::new();
        stream.extend_from_slice(b"DBG_boot\r\n");
        stream.extend_from_slice(&frame_bytes(&payload));
        stream.extend_from_slice(&[SENTINEL, 99]); // rejected length
        stream.extend_from_slice(b"R_GND:1200\r");
        stream.extend_from_slice(b"orphan"); // interrupted by sentinel
        stream.extend_from_slice(&frame_bytes(&payload));
        stream.extend_from_slice(&[0x02]); // noise
        stream.extend_from_slice(b"READY\n");

        let mut batch = demux();
        let batch_events = batch.push(&stream);

        let mut byte_at_a_time = demux();
        let mut incremental_events = Vec::new();
        for &b in &stream {
            incremental_events.extend(byte_at_a_time.feed(b));
        }

        assert_eq!(batch_events, incremental_events);
        assert_eq!(batch_events.len(), 5);
    }

    #[test]
    fn test_reset_drops_partial_state() {
        let mut d = demux();
        d.push(&[SENTINEL, FRAME_SAMPLES as u8, 1, 2, 3]);
        d.reset();
        assert_eq!(*d.state(), ParserState::Idle);

        d.push(b"half");
        assert_eq!(d.pending_line_len(), 4);
        d.reset();
        assert_eq!(d.pending_line_len(), 0);

        let payload = vec![9; FRAME_SAMPLES];
        let events = d.push(&frame_bytes(&payload));
        assert_eq!(events, vec![LinkEvent::Frame(SampleFrame::new(payload))]);
    }
}
