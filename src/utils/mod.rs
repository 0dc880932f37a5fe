//! Small text helpers shared by the client and the renderer.

use unicode_width::UnicodeWidthChar;

/// Longest prefix of `s` that fits in `max_bytes` without splitting a char.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Fit `s` into `max_cols` terminal columns, marking a cut with `…`.
pub fn fit_width(s: &str, max_cols: usize) -> String {
    let total: usize = s.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_cols {
        return s.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_cols - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_short_input_untouched() {
        assert_eq!(truncate_str("Run 5k", 10), "Run 5k");
        assert_eq!(truncate_str("Run 5k", 3), "Run");
        assert_eq!(truncate_str("", 4), "");
    }

    #[test]
    fn test_truncate_str_backs_off_char_boundary() {
        // "é" is two bytes
        let s = "café!";
        assert_eq!(truncate_str(s, 4), "caf");
        assert_eq!(truncate_str(s, 5), "café");
        assert_eq!(truncate_str("🦀", 2), "");
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width("Reading", 10), "Reading");
        assert_eq!(fit_width("Reading list", 8), "Reading…");
        assert_eq!(fit_width("abc", 0), "");
    }

    #[test]
    fn test_fit_width_wide_chars() {
        // Each CJK char takes two columns
        assert_eq!(fit_width("目標目標", 5), "目標…");
    }
}
