//! Domain types and pure helpers for the audio-to-storyboard pipeline.
//!
//! Holds the storyboard data model, per-phase configuration, deterministic
//! output naming and layout, audio format negotiation, and prompt text.
//! Has no internal dependencies so every other crate can build on it.

pub mod audio;
pub mod checkpointing;
pub mod config;
pub mod error;
pub mod hashing;
pub mod naming;
pub mod prompts;
pub mod storyboard;
