//! Shared library for the marquee video playback orchestration system.
//!
//! Holds everything both ends of the link need: the wire protocol exchanged
//! between coordinator, player, and observers, plus logging and time setup
//! used by the binaries.

pub mod logger;
pub mod protocol;
pub mod time;
