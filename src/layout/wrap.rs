//! Approximate-width text wrapping.
//!
//! There is no font measurement here: every character is assumed to be
//! `0.55 x font_size` wide. The same estimate drives row-height computation
//! and final line breaking, so both always agree.

/// Average glyph width as a fraction of the font size.
pub const AVG_CHAR_WIDTH_FACTOR: f64 = 0.55;

/// Estimated width of one average character.
pub fn average_char_width(font_size: f64) -> f64 {
    font_size * AVG_CHAR_WIDTH_FACTOR
}

/// Estimated pixel width of `text`: `(chars + 1) x average_char_width`.
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
    estimate_width_for_chars(text.chars().count(), font_size)
}

fn estimate_width_for_chars(chars: usize, font_size: f64) -> f64 {
    (chars + 1) as f64 * average_char_width(font_size)
}

/// Break `text` into display lines no wider than `max_width`.
///
/// Explicit `\n` breaks are kept; an empty segment between two breaks becomes
/// a blank `""` line. Words are never split: a word wider than `max_width`
/// sits alone on its own line. Empty input yields no lines.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();
    if text.is_empty() {
        return lines;
    }

    for segment in text.split('\n') {
        let mut current = String::new();
        let mut current_chars = 0usize;

        for word in segment.split_whitespace() {
            let word_chars = word.chars().count();
            if current.is_empty() {
                current.push_str(word);
                current_chars = word_chars;
                continue;
            }

            let candidate_chars = current_chars + 1 + word_chars;
            if estimate_width_for_chars(candidate_chars, font_size) < max_width {
                current.push(' ');
                current.push_str(word);
                current_chars = candidate_chars;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
                current_chars = word_chars;
            }
        }

        lines.push(current);
    }

    lines
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_lines() {
        assert!(wrap_text("", 100.0, 16.0).is_empty());
    }

    #[test]
    fn test_two_words_per_line() {
        // "The quick" = 9 chars -> 88px; "The quick brown" = 15 chars -> 140.8px
        let lines = wrap_text("The quick brown fox", 100.0, 16.0);
        assert_eq!(lines, vec!["The quick", "brown fox"]);
    }

    #[test]
    fn test_explicit_breaks_and_blank_lines() {
        let lines = wrap_text("a\n\nb", 500.0, 16.0);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_trailing_newline_keeps_blank_line() {
        assert_eq!(wrap_text("a\n", 500.0, 16.0), vec!["a", ""]);
    }

    #[test]
    fn test_long_word_is_not_split() {
        let lines = wrap_text("a supercalifragilistic b", 40.0, 16.0);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_non_positive_width_puts_each_word_alone() {
        assert_eq!(wrap_text("x y z", 0.0, 16.0), vec!["x", "y", "z"]);
        assert_eq!(wrap_text("x y", -5.0, 16.0), vec!["x", "y"]);
    }

    #[test]
    fn test_width_estimate_counts_chars_not_bytes() {
        assert_eq!(estimate_text_width("ab", 10.0), 3.0 * 5.5);
        assert_eq!(estimate_text_width("éé", 10.0), 3.0 * 5.5);
    }

    #[test]
    fn test_carriage_returns_are_whitespace() {
        assert_eq!(wrap_text("a\r\nb", 500.0, 16.0), vec!["a", "b"]);
    }
}
