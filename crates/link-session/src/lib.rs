//! Session layer for the instrument link.
//!
//! [`LinkSession`] owns the physical byte source, drives the demultiplexer
//! one byte at a time, and dispatches completed [`core_types::LinkEvent`]s
//! over a channel to the presentation layer. It also retains the most recent
//! sample frame so a capture can be exported after the fact.
//!
//! The model is single-threaded cooperative polling: the caller invokes
//! [`LinkSession::poll`] on a fixed cadence, and each call runs to completion
//! over whatever bytes are currently available. Concurrent polls are not
//! supported; one logical session owns its parser state.

pub mod export;
pub mod session;

pub use session::LinkSession;
