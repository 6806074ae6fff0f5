//! Sentence-level text processing
//!
//! Pure functions over extracted document text: sentence segmentation,
//! URL detection/stripping, and question classification. No side effects;
//! the playback engine drives all suspension behavior.

pub mod links;
pub mod question;
pub mod segment;

pub use links::{contains_link, strip_links};
pub use question::is_question;
pub use segment::segment;
