//! RustyBabel is a real-time speech-to-speech translation pipeline.
//!
//! Microphone audio is captured continuously, encoded as 16-bit PCM and
//! streamed to a remote translation engine over a bidirectional channel.
//! The engine answers with translated speech in incremental fragments that
//! are scheduled for gapless playback while the user is still talking, and
//! may cancel audio already in flight when the user barges in.
//!
//! The crate is structured into several modules, each responsible for one
//! stage of the duplex audio pipeline.

/// Audio capture from the microphone, in fixed-size PCM blocks.
pub mod capture;
/// Bidirectional streaming channel to the translation engine.
pub mod channel;
/// PCM sample conversion and wire framing.
pub mod codec;
/// Handles configuration loading and management.
pub mod config;
/// Logging utilities for the application.
pub mod log;
/// Playback clock and gapless fragment scheduling.
pub mod playback;
/// Live audio session orchestration, state machine and transcript log.
pub mod session;
/// Small shared helpers.
pub mod util;
