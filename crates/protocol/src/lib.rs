//! Text protocol spoken over the instrument link.
//!
//! Inbound: prefix-tagged telemetry lines ([`Telemetry`], [`parse_line`]).
//! Outbound: generator and measurement commands ([`Command`]) encoded as
//! CR LF terminated ASCII, which keeps them on the line path of the wire
//! format by construction.
//!
//! Framing is not handled here: the demultiplexer delivers completed lines,
//! and this crate only interprets or produces their content.

pub mod commands;
pub mod telemetry;

pub use commands::{Command, WaveShape};
pub use telemetry::{parse_line, Telemetry};
