//! Legend label wrapping.

/// Longest label line before wrapping.
pub const DEF_LABEL_MAX_LENGTH: usize = 40;

/// Most lines a wrapped label keeps.
pub const DEF_LABEL_MAX_LINES: usize = 3;

const OVERFLOW_MARKER: &str = "..";

/// Break `text` into at most `max_lines` lines of at most `max_len` characters.
///
/// Lines break after the last space that fits, or mid-word when none does.
/// Text that already contains a newline, or fits on one line, is returned
/// unchanged. When the lines run out before the text does, the last line
/// ends with `..`, unless `max_len` is too short to hold the marker.
///
/// ```
/// use gogviz::legend::wrap_label;
///
/// assert_eq!(wrap_label("Lorem ipsum dolor sit amet", 10, 4), "Lorem\nipsum\ndolor sit\namet");
/// assert_eq!(wrap_label("abcdefghij", 4, 2), "abcd\nef..");
/// ```
#[must_use]
pub fn wrap_label(text: &str, max_len: usize, max_lines: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if text.contains('\n') || chars.len() <= max_len || max_len == 0 || max_lines == 0 {
        return text.to_string();
    }

    let mut lines: Vec<String> = Vec::with_capacity(max_lines);
    let mut idx = 0;
    while lines.len() < max_lines && idx < chars.len() {
        while idx < chars.len() && chars[idx] == ' ' {
            idx += 1;
        }
        if idx == chars.len() {
            break;
        }
        let end = (idx + max_len).min(chars.len());
        let chunk = &chars[idx..end];
        let cut = if end == chars.len() || chars[end] == ' ' {
            chunk.len()
        } else {
            chunk.iter().rposition(|c| *c == ' ').map_or(chunk.len(), |space| space + 1)
        };
        let line: String = chunk[..cut].iter().collect();
        lines.push(line.trim_end().to_string());
        idx += cut;
    }

    let consumed = chars[idx..].iter().all(|c| *c == ' ');
    if !consumed && max_len >= OVERFLOW_MARKER.len() {
        if let Some(last) = lines.last_mut() {
            let keep = last.chars().count().min(max_len.saturating_sub(OVERFLOW_MARKER.len()));
            *last = last.chars().take(keep).collect::<String>() + OVERFLOW_MARKER;
        }
    }
    lines.join("\n")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_newline_text_is_untouched(a in "[a-z ]{0,60}", b in "[a-z ]{0,60}", max in 1usize..20) {
            let text = format!("{a}\n{b}");
            prop_assert_eq!(wrap_label(&text, max, 3), text);
        }

        #[test]
        fn prop_short_text_is_untouched(text in "[a-z ]{0,20}", extra in 0usize..10) {
            let max = text.chars().count() + extra;
            prop_assert_eq!(wrap_label(&text, max, 3), text);
        }

        #[test]
        fn prop_line_budget_respected(text in "[a-z ]{1,120}", max in 1usize..15, lines in 1usize..5) {
            let wrapped = wrap_label(&text, max, lines);
            if text.chars().count() > max {
                prop_assert!(wrapped.lines().count() <= lines);
                for line in wrapped.lines() {
                    prop_assert!(line.chars().count() <= max);
                }
            }
        }

        #[test]
        fn prop_overflow_ends_with_marker(text in "[a-z]{1,8}( [a-z]{1,8}){0,15}", max in 3usize..12, lines in 1usize..4) {
            let wrapped = wrap_label(&text, max, lines);
            let kept: usize = wrapped.lines().map(|l| l.trim_end_matches("..").replace(' ', "").len()).sum();
            let total = text.replace(' ', "").len();
            if text.chars().count() > max && kept < total {
                prop_assert!(wrapped.ends_with(".."));
            }
        }
    }
}
