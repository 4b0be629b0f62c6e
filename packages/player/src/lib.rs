//! Device-side player agent for the marquee video playback orchestration
//! system.
//!
//! The agent keeps a WebSocket session to the coordinator (reconnecting
//! with a debounced fixed delay when it drops) and supervises exactly one
//! external media-player process. A monotonic generation counter
//! distinguishes the current process from superseded ones, so a stale exit
//! event can never corrupt playback state.

pub mod error;
pub mod launcher;
pub mod reconnect;
pub mod runner;
mod session;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod testutil;
