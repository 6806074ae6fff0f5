//! # Lectern Common Library
//!
//! Shared code for the Lectern read-aloud service:
//! - Event types (ReaderEvent enum, PlaybackState)
//! - Common error type
//! - Configuration loading and root folder resolution

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{PlaybackState, ReaderEvent};
