use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 5] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Clean up the text of a single span.
///
/// NFC normalization, ligature expansion, control and replacement character
/// removal, and collapsing of space runs. Case is preserved: caption detection
/// downstream depends on it.
pub fn normalize_span_text(text: &str) -> String {
    let mut result: String = text.nfc().collect();

    for (ligature, replacement) in LIGATURES {
        if result.contains(ligature) {
            result = result.replace(ligature, replacement);
        }
    }

    result.retain(|c| c != '\u{FFFD}' && (c == ' ' || !c.is_control()));

    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    let re_spaces = RE_SPACES.get_or_init(|| Regex::new(r" {2,}").unwrap());
    re_spaces.replace_all(&result, " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough() {
        assert_eq!(normalize_span_text("Step 1: Drill"), "Step 1: Drill");
    }

    #[test]
    fn test_ligatures() {
        assert_eq!(normalize_span_text("\u{FB01}nal-rivet"), "final-rivet");
        assert_eq!(normalize_span_text("ba\u{FB04}e"), "baffle");
    }

    #[test]
    fn test_control_and_replacement_removed() {
        assert_eq!(normalize_span_text("PA\u{FFFD}GE\r\t"), "PAGE");
    }

    #[test]
    fn test_space_runs_collapsed() {
        assert_eq!(normalize_span_text("PAGE    42-01"), "PAGE 42-01");
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(normalize_span_text("FIGURE 3"), "FIGURE 3");
    }

    #[test]
    fn test_nfc() {
        assert_eq!(normalize_span_text("e\u{0301}"), "\u{00E9}");
    }
}
