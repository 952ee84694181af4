//! Ordering of page labels and step numbers for output.
//!
//! Plain string order puts `"10"` before `"2"` and `"10-01"` before `"9-01"`.
//! [`KeyOrder::Natural`] compares runs of ASCII digits by numeric value and
//! everything else character by character, so `9-03 < 9-10 < 10-01 < 42A-16`
//! and `42-16 < 42A-16`.
//!
//! Mixed labels get the same treatment as digit-only ones: `9A-03` sorts with
//! the other section 9 labels, before `10-01`. Falling back to string order
//! for mixed labels only would not be transitive (`9-03 < 10-01 < 10A-01 <
//! 9-03`), which `sort_by` does not allow.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyOrder {
    /// Digit runs compared numerically.
    #[default]
    Natural,
    /// Byte-wise string comparison.
    Lexical,
}

/// Compare two keys using the given order.
pub fn compare_keys(a: &str, b: &str, order: KeyOrder) -> Ordering {
    match order {
        KeyOrder::Natural => natural_cmp(a, b),
        KeyOrder::Lexical => a.cmp(b),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }

    if let Some(prev) = in_digits {
        out.push(make_chunk(&s[start..], prev));
    }

    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
}

fn cmp_chunk(a: &Chunk<'_>, b: &Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
        (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        // A digit run sorts against text the same way any single digit would.
        (Chunk::Digits(x), Chunk::Text(y)) | (Chunk::Text(y), Chunk::Digits(x)) => {
            let ord = x.cmp(y);
            if matches!(a, Chunk::Digits(_)) {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

/// Natural comparison with a final byte-wise tie-break, so it is a total order
/// (`"01"` and `"1"` are not equal).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = cmp_chunk(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}
