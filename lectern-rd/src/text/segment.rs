//! Sentence segmentation
//!
//! Splits raw extracted text into the ordered sentence sequence that the
//! playback engine iterates over. Deterministic and pure.

/// Split raw text into sentences.
///
/// A sentence ends at `.`, `!`, or `?` followed by whitespace (or end of
/// input). The terminator stays with its sentence. Trailing text without a
/// terminator becomes a final sentence, so content is never dropped
/// silently. Empty or whitespace-only input yields an empty sequence.
pub fn segment(raw: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if current.is_empty() && c.is_whitespace() {
            continue;
        }
        current.push(c);

        if matches!(c, '.' | '!' | '?') {
            // Only a terminator at a whitespace boundary ends the sentence,
            // so "3.14" and "example.com" stay intact
            let at_boundary = match chars.peek() {
                Some(next) => next.is_whitespace(),
                None => false, // end of input handled by the tail below
            };
            if at_boundary {
                sentences.push(current.trim_end().to_string());
                current.clear();
            }
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}
