//! Playback engine for sentence-by-sentence reading
//!
//! Owns the sentence sequence and the playback state machine, and drives the
//! per-sentence pipeline: gate check, synthesis, audio emission, pacing,
//! index advance, question check.

pub mod engine;

pub use engine::ReaderSession;
