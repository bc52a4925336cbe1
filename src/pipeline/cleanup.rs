//! Deterministic cleanup of raw page text.
//!
//! Both backends hand back text with quirks that are not content: PDFium
//! separates lines with `\r\n`, Tesseract terminates every page with a form
//! feed, and both can leave zero-width characters and runs of empty lines
//! behind. The rules below remove exactly that and nothing else; words,
//! line breaks and indentation are left as extracted.
//!
//! Rules, applied in order:
//!
//! 1. Normalise line endings to `\n`
//! 2. Drop control characters other than `\n` and `\t` (form feeds, NUL, …)
//! 3. Drop invisible Unicode (zero-width spaces, BOM, soft hyphens, …)
//! 4. Trim trailing whitespace on every line
//! 5. Collapse 3+ consecutive blank lines down to 2
//! 6. Strip leading and trailing blank lines

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every cleanup rule to one page of text.
///
/// Returns an empty string for a page that held nothing but whitespace and
/// layout characters.
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_control_chars(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    strip_outer_blank_lines(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Control characters ──────────────────────────────────────────────

fn remove_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !c.is_control())
        .collect()
}

// ── Rule 3: Invisible Unicode ───────────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FFFE}',
        ],
        "",
    )
}

// ── Rule 4: Trailing whitespace ─────────────────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Blank-line runs ─────────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n\n").into_owned()
}

// ── Rule 6: Outer blank lines ───────────────────────────────────────────────

fn strip_outer_blank_lines(input: &str) -> String {
    input.trim_matches('\n').to_string()
}
