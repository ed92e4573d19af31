//! Line cleanup shared by every matcher in the pipeline.

use regex::Regex;
use std::sync::LazyLock;

/// Zero-width and bidi control characters that chat exports sprinkle around
/// names, timestamps and phone numbers.
const INVISIBLE: &[char] = &[
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{200E}', '\u{200F}', '\u{202A}', '\u{202B}',
    '\u{202C}', '\u{202D}', '\u{202E}', '\u{2060}', '\u{2066}', '\u{2067}', '\u{2068}',
    '\u{2069}', '\u{FEFF}',
];

/// `[timestamp] Sender:` at the start of an exported message.
static MESSAGE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]*\][^:]*:\s*").expect("valid message prefix pattern"));

/// Strip invisible characters and any trailing line terminator.
pub fn normalize_line(line: &str) -> String {
    line.trim_end_matches(['\r', '\n'])
        .chars()
        .filter(|c| !INVISIBLE.contains(c))
        .collect()
}

/// Split a whole transcript into normalized lines.
/// `\r\n`, `\r` and `\n` all count as line breaks.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(normalize_line)
        .collect()
}

/// Message text without the `[timestamp] Sender:` prefix, trimmed.
/// Lines without a prefix (continuation lines) are only trimmed.
pub fn message_body(line: &str) -> &str {
    match MESSAGE_PREFIX.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_invisible_chars() {
        let line = "\u{200E}[02/01/26, 10:00:00] Ana:\u{200B} Rua\u{202F}X\r\n";
        assert_eq!(normalize_line(line), "[02/01/26, 10:00:00] Ana: Rua\u{202F}X");
    }

    #[test]
    fn test_normalize_keeps_emoji_variation_selector() {
        assert_eq!(normalize_line("🏎️1"), "🏎️1");
    }

    #[test]
    fn test_split_lines_mixed_endings() {
        let lines = split_lines("\u{FEFF}a\r\nb\rc\nd");
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_split_lines_empty() {
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_message_body_strips_prefix() {
        assert_eq!(
            message_body("[02/01/26, 10:00:00] Ana Souza: Essas foram da Karol"),
            "Essas foram da Karol"
        );
    }

    #[test]
    fn test_message_body_first_colon_only() {
        assert_eq!(
            message_body("[02/01/26, 10:00:00] Ana: Rua X: 12"),
            "Rua X: 12"
        );
    }

    #[test]
    fn test_message_body_continuation_line() {
        assert_eq!(message_body("  2x Produto A  "), "2x Produto A");
    }

    #[test]
    fn test_message_body_empty_message() {
        assert_eq!(message_body("[02/01/26, 10:00:00] Ana:"), "");
    }
}
