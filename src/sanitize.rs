//! Display-string sanitization for filesystem path segments
//!
//! Matches the sanitizer the Docvault app itself uses, so the bundles this
//! importer writes land exactly where the app would put them.

/// Maximum UTF-8 byte length of a single path segment
const MAX_SEGMENT_BYTES: usize = 255;

/// Fallback for names that sanitize down to nothing
const FALLBACK_NAME: &str = "Untitled";

/// Turn an arbitrary display string into a safe filesystem path segment.
///
/// Applied in order:
/// 1. Every occurrence of `..` becomes a single `_` (path traversal)
/// 2. Each `/`, `:`, and control character (0-31) becomes a `-`
/// 3. Runs of spaces collapse to one space
/// 4. Leading/trailing whitespace and dots are trimmed
/// 5. The result is truncated from the end to at most 255 UTF-8 bytes
/// 6. An empty result becomes `Untitled`
///
/// Pure and deterministic: the same input always yields the same output.
pub fn sanitize_segment(name: &str) -> String {
    let name = name.replace("..", "_");

    let mut out = String::with_capacity(name.len());
    let mut prev_space = false;
    for c in name.chars() {
        let c = match c {
            '/' | ':' => '-',
            c if (c as u32) < 32 => '-',
            c => c,
        };
        if c == ' ' {
            if prev_space {
                continue;
            }
            prev_space = true;
        } else {
            prev_space = false;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches(|c: char| c.is_whitespace() || c == '.');

    let mut result = trimmed.to_string();
    while result.len() > MAX_SEGMENT_BYTES {
        result.pop();
    }

    if result.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        result
    }
}

/// Derive a display title from a markdown file name.
///
/// Strips the `.md` extension, drops one purely-numeric ordering prefix
/// (`02_meeting_notes` -> `meeting_notes`), replaces underscores with
/// spaces, and capitalizes each word.
pub fn clean_title(filename: &str) -> String {
    let name = filename.strip_suffix(".md").unwrap_or(filename);

    let name = match name.split_once('_') {
        Some((prefix, rest)) if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) => {
            rest
        }
        _ => name,
    };

    let name = name.replace('_', " ");

    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
