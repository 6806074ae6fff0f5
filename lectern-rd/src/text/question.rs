//! Question classification
//!
//! Decides whether a spoken sentence should trigger an automatic pause so
//! the listener can answer before playback continues.

/// Lead words/phrases that mark an interrogative sentence
const QUESTION_STARTERS: &[&str] = &[
    "who", "what", "when", "where", "why", "how", "give an", "examples",
];

/// Words that look like question starters but are not ("however ..." is
/// a statement, not a question)
const EXCLUDED_WORDS: &[&str] = &[
    "whoever", "whatever", "whenever", "wherever", "whyever", "however",
];

/// True if the sentence reads as a question.
///
/// Case- and whitespace-insensitive. A sentence is a question if it ends
/// with `?`, or starts with an interrogative lead word while not ending
/// with `!` and not containing any excluded word as a substring.
pub fn is_question(sentence: &str) -> bool {
    let normalized = sentence.trim().to_lowercase();

    if normalized.ends_with('?') {
        return true;
    }

    QUESTION_STARTERS
        .iter()
        .any(|starter| normalized.starts_with(starter))
        && !normalized.ends_with('!')
        && !EXCLUDED_WORDS.iter().any(|word| normalized.contains(word))
}
