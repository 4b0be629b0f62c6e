//! Coordinator process for the marquee video playback orchestration system.
//!
//! Mediates all traffic between the single player device and any number of
//! observer clients, and owns the canonical play-state table. Observers send
//! playback commands; the player reports authoritative state changes; the
//! coordinator keeps everyone eventually consistent via broadcast
//! notifications.

pub mod auth;
pub mod catalog;
mod handler;
pub mod playstate;
pub mod registry;
pub mod relay;
mod server;
mod signal;
pub mod state;

pub use server::Server;
