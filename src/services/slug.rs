//! Slug and word helpers
//!
//! Pure text transformations used wherever a human-entered title must become
//! a URL-safe identifier.

/// Generate a URL-friendly slug from a title.
///
/// Lower-cases the input, replaces runs of non-alphanumeric characters with
/// a single hyphen, and strips leading/trailing hyphens.
pub fn generate_slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_hyphen = false;

    for c in input.trim().chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen && !out.is_empty() {
            out.push('-');
            prev_hyphen = true;
        }
    }

    out.trim_end_matches('-').to_string()
}

/// Capitalize a single word: first character upper-cased, rest lower-cased.
pub fn capitalize_word(word: &str) -> String {
    let word = word.trim();
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}
