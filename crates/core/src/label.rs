//! Page label recovery.
//!
//! Plans pages carry their logical page number in one of three shapes, depending
//! on how the layout pass split the header text:
//!
//! ```text
//! "PAGE 42-01"          label and marker in one fragment
//! "PAGE" / "42-01"      marker and label in consecutive fragments
//! "PAGE\nPAGE" / "42-01" marker duplicated by overlapping text runs
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::types::Label;

/// Bare marker fragments that announce a label in the following fragment.
pub const PAGE_MARKERS: [&str; 3] = ["PAGE", "PAGEPAGE", "PAGEPAGEPAGE"];

/// Logo text printed next to the page header on every page.
pub const NOISE_TOKEN: &str = "RV-12";

fn label_with_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"PAGE:?\s?[0-9]?[0-9][A-Z]?-[0-9][0-9]").unwrap())
}

fn bare_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]?[0-9][A-Z]?-[0-9][0-9]").unwrap())
}

/// Normalize a fragment for marker comparison.
pub fn clean_fragment(fragment: &str) -> String {
    fragment
        .replace('\n', "")
        .replace(':', "")
        .replace(NOISE_TOKEN, "")
        .trim()
        .to_string()
}

/// Whether the fragment is nothing but a `PAGE` marker.
pub fn is_page_marker(fragment: &str) -> bool {
    let cleaned = clean_fragment(fragment);
    PAGE_MARKERS.contains(&cleaned.as_str())
}

fn label_from_match(matched: &str) -> Label {
    let label = matched
        .strip_prefix("PAGE")
        .unwrap_or(matched)
        .trim_start_matches(':')
        .trim();
    Label::new(label)
}

/// Find the page label among a page's fragments.
///
/// Scans in order and stops at the first fragment that yields a label, so a
/// header repeated further down the page is ignored. A label without the
/// `PAGE` prefix is only accepted right after a bare marker fragment; numeric
/// noise elsewhere on the page never matches.
pub fn resolve_label<S: AsRef<str>>(fragments: &[S]) -> Option<Label> {
    let mut candidates: Vec<usize> = Vec::new();

    for (index, fragment) in fragments.iter().enumerate() {
        let fragment = fragment.as_ref();

        if is_page_marker(fragment) {
            candidates.push(index + 1);
        }

        // Inner newlines stay: digits on adjacent lines must not run together.
        let line = fragment.trim_matches('\n');

        let found = label_with_marker().find(line).or_else(|| {
            if candidates.contains(&index) {
                bare_label().find(line)
            } else {
                None
            }
        });

        if let Some(m) = found {
            return Some(label_from_match(m.as_str()));
        }
    }

    None
}
