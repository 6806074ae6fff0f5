//! lectern-rd specific configuration

use std::path::PathBuf;

/// Reader service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root folder for stored documents
    pub root_folder: PathBuf,
    /// Port the HTTP API listens on
    pub port: u16,
    /// Playback speed factor applied to pacing (> 0)
    pub speech_speed: f32,
}
