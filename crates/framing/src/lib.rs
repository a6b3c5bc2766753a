//! Byte-stream demultiplexing for the shared instrument link.
//!
//! The device interleaves two wire formats on one serial channel:
//!
//! - ASCII status lines: printable bytes (0x20-0x7E) terminated by CR or LF.
//! - Binary sample frames: `0xAA`, a one-byte length, then that many raw
//!   sample codes.
//!
//! The sentinel byte 0xAA lies outside the printable range, so a frame start
//! can never be confused with line content and no escaping mechanism is
//! needed. [`FrameDemux`] turns the stream into typed
//! [`core_types::LinkEvent`]s without loss of ordering, resumable across any
//! splitting of the input.

pub mod demux;

pub use demux::{FrameDemux, ParserState, SENTINEL};
