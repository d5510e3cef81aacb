//! Escaped-token scanner for contact attribute values.
//!
//! Contact attributes are flat strings, so a multi-valued DG param is written
//! as space-separated tokens:
//!
//! ```text
//! someTag1 some\ multi\ word\ tag   →   ["someTag1", "some multi word tag"]
//! ```
//!
//! A backslash escapes a following space or backslash. Before any other
//! character it is kept literally, so `some\Tag` stays `some\Tag`.

const SEPARATOR: char = ' ';
const ESCAPE: char = '\\';

/// Split `input` on unescaped spaces, resolving `\ ` and `\\` escapes.
///
/// Always returns at least one token. Empty tokens are kept (two adjacent
/// spaces yield an empty token between them); trimming is the caller's job.
pub fn scan(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_was_unescaped_escape = false;

    for ch in input.chars() {
        if prev_was_unescaped_escape && (ch == SEPARATOR || ch == ESCAPE) {
            // The escape char is always the last one buffered here.
            let _ = current.pop();
            current.push(ch);
            prev_was_unescaped_escape = false;
            continue;
        }

        if ch == SEPARATOR {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
        prev_was_unescaped_escape = ch == ESCAPE;
    }

    tokens.push(current);
    tokens
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
