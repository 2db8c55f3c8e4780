// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Escaping of destination formatting control characters (MarkdownV2).

/// Characters that must be prefixed with a backslash.
pub const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Whether `c` is a reserved formatting character.
pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Escape every reserved character in `text`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if is_reserved(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape one line of a post.
///
/// A leading `>` is a blockquote marker and stays unescaped; only the rest of
/// the line is escaped.
pub fn escape_line(line: &str) -> String {
    match line.strip_prefix('>') {
        Some(rest) => {
            let mut out = String::with_capacity(line.len() + 8);
            out.push('>');
            out.push_str(&escape(rest));
            out
        }
        None => escape(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_example() {
        assert_eq!(escape("Check *this* [out]."), r"Check \*this\* \[out\]\.");
    }

    #[test]
    fn test_escape_every_reserved_char() {
        for &c in RESERVED {
            assert_eq!(escape(&c.to_string()), format!("\\{}", c));
        }
    }

    #[test]
    fn test_escape_passthrough() {
        assert_eq!(escape("plain text 123 привет"), "plain text 123 привет");
        assert_eq!(escape(""), "");
        // backslash is not in the reserved set
        assert_eq!(escape(r"a\b"), r"a\b");
    }

    #[test]
    fn test_escape_line_keeps_quote_marker() {
        assert_eq!(escape_line(">quoted. text"), r">quoted\. text");
        assert_eq!(escape_line(">>not a link"), r">\>not a link");
        assert_eq!(escape_line("no quote!"), r"no quote\!");
    }
}
