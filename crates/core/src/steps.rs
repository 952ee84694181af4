//! Splitting a labelled page into numbered steps.
//!
//! Fragments are consumed in reading order:
//!
//! - an all-caps fragment is a figure caption: it closes the open step and is
//!   discarded;
//! - a fragment starting with `Step N: ` closes the open step and opens step `N`;
//! - anything else continues the open step, or is dropped when no step is open
//!   (page titles and other front matter).

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{Label, PageSteps, StepNumber, StepText};

/// What to do with steps on the first page of a section (`NN-01`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstPagePolicy {
    /// Segment every page the same way.
    #[default]
    ProcessAll,
    /// Return no steps for section first pages.
    SkipSectionFirstPage,
}

/// What to do with a step still open when the page ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingStep {
    /// Keep it like any other step.
    #[default]
    Flush,
    /// Drop it.
    Discard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentOptions {
    pub first_page: FirstPagePolicy,
    pub trailing_step: TrailingStep,
}

fn step_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Step ([0-9][0-9]?): ").unwrap())
}

/// A fragment with at least one cased character and no lowercase ones.
pub fn is_caption(fragment: &str) -> bool {
    let mut cased = false;
    for c in fragment.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Newlines become spaces.
pub fn normalize_fragment(fragment: &str) -> String {
    fragment.replace('\n', " ")
}

/// Split a `Step N: ` prefix off a normalized fragment.
///
/// Only the leading marker is removed; a step body mentioning another step
/// keeps that text.
pub fn split_step_marker(text: &str) -> Option<(StepNumber, String)> {
    let caps = step_marker().captures(text)?;
    let whole = caps.get(0)?;
    let number = caps.get(1)?;
    Some((
        StepNumber::new(number.as_str()),
        text[whole.end()..].trim().to_string(),
    ))
}

/// Accumulates the open step while walking a page.
#[derive(Debug, Default)]
struct Segmenter {
    steps: PageSteps,
    current: Option<(StepNumber, Vec<String>)>,
}

impl Segmenter {
    fn close(&mut self) {
        if let Some((number, text)) = self.current.take() {
            self.steps.insert(number, StepText::new(text));
        }
    }

    fn open(&mut self, number: StepNumber, seed: String) {
        self.close();
        self.current = Some((number, vec![seed]));
    }

    fn push(&mut self, fragment: &str) {
        if is_caption(fragment) {
            self.close();
            return;
        }

        let text = normalize_fragment(fragment);
        match split_step_marker(&text) {
            Some((number, seed)) => self.open(number, seed),
            None => {
                if let Some((_, lines)) = self.current.as_mut() {
                    lines.push(text.trim().to_string());
                }
            }
        }
    }

    fn finish(mut self, trailing: TrailingStep) -> PageSteps {
        match trailing {
            TrailingStep::Flush => self.close(),
            TrailingStep::Discard => self.current = None,
        }
        self.steps
    }
}

/// Group a page's fragments into steps keyed by step number.
///
/// A step number repeated on the same page keeps the later run.
pub fn segment<S: AsRef<str>>(
    label: &Label,
    fragments: &[S],
    options: &SegmentOptions,
) -> PageSteps {
    if options.first_page == FirstPagePolicy::SkipSectionFirstPage
        && label.is_section_first_page()
    {
        return PageSteps::new();
    }

    let mut segmenter = Segmenter::default();
    for fragment in fragments {
        segmenter.push(fragment.as_ref());
    }
    segmenter.finish(options.trailing_step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(label: &str, fragments: &[&str], options: SegmentOptions) -> Vec<(String, Vec<String>)> {
        segment(&Label::new(label), fragments, &options)
            .into_iter()
            .map(|(n, t)| (n.to_string(), t.fragments().to_vec()))
            .collect()
    }

    fn step(n: &str, lines: &[&str]) -> (String, Vec<String>) {
        (n.to_string(), lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_captions_split_steps() {
        let steps = run(
            "42-02",
            &[
                "Step 1: Remove panel\n",
                "FIGURE 3\n",
                "Step 2: Install bracket\n",
            ],
            SegmentOptions::default(),
        );
        assert_eq!(
            steps,
            vec![step("1", &["Remove panel"]), step("2", &["Install bracket"])]
        );
    }

    #[test]
    fn test_continuation_lines() {
        let steps = run(
            "42-02",
            &["Step 5: Torque bolt\n", "to 25 in-lb\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("5", &["Torque bolt", "to 25 in-lb"])]);
    }

    #[test]
    fn test_caption_closes_step_and_later_text_is_dropped() {
        let steps = run(
            "42-02",
            &[
                "Step 1: Deburr the edges\n",
                "SKIN\n",
                "a stray label next to the figure\n",
            ],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("1", &["Deburr the edges"])]);
    }

    #[test]
    fn test_front_matter_dropped() {
        let steps = run(
            "42-02",
            &[
                "Tailcone Assembly\n",
                "Step 1: Cleco the skins\n",
            ],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("1", &["Cleco the skins"])]);
    }

    #[test]
    fn test_multiline_fragment_normalized() {
        let steps = run(
            "42-02",
            &["Step 3: Match-drill the\nattach holes\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("3", &["Match-drill the attach holes"])]);
    }

    #[test]
    fn test_marker_followed_by_line_break() {
        let steps = run(
            "42-02",
            &["Step 2: \nFinal-rivet the flange\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("2", &["Final-rivet the flange"])]);
    }

    #[test]
    fn test_only_leading_marker_removed() {
        let steps = run(
            "42-02",
            &["Step 4: Step 4: repeat the previous step\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("4", &["Step 4: repeat the previous step"])]);
    }

    #[test]
    fn test_marker_requires_space_after_colon() {
        let steps = run(
            "42-02",
            &["Step 1: Start\n", "Step 2:done\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("1", &["Start", "Step 2:done"])]);
    }

    #[test]
    fn test_three_digit_step_is_not_a_marker() {
        let steps = run(
            "42-02",
            &["Step 1: Start\n", "Step 100: not a step\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("1", &["Start", "Step 100: not a step"])]);
    }

    #[test]
    fn test_numeric_fragment_is_not_a_caption() {
        let steps = run(
            "42-02",
            &["Step 1: Cut to length\n", "3/32\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("1", &["Cut to length", "3/32"])]);
    }

    #[test]
    fn test_trailing_step_discarded_on_request() {
        let options = SegmentOptions {
            trailing_step: TrailingStep::Discard,
            ..SegmentOptions::default()
        };
        let steps = run(
            "42-02",
            &["Step 1: First\n", "FIGURE 1\n", "Step 2: Second\n"],
            options,
        );
        assert_eq!(steps, vec![step("1", &["First"])]);
    }

    #[test]
    fn test_first_page_processed_by_default() {
        let steps = run("42-01", &["Step 1: Inventory\n"], SegmentOptions::default());
        assert_eq!(steps, vec![step("1", &["Inventory"])]);
    }

    #[test]
    fn test_first_page_skipped_on_request() {
        let options = SegmentOptions {
            first_page: FirstPagePolicy::SkipSectionFirstPage,
            ..SegmentOptions::default()
        };
        assert!(run("42-01", &["Step 1: Inventory\n"], options).is_empty());
        assert_eq!(
            run("42-02", &["Step 1: Inventory\n"], options),
            vec![step("1", &["Inventory"])]
        );
    }

    #[test]
    fn test_repeated_step_number_keeps_later_run() {
        let steps = run(
            "42-02",
            &["Step 1: Old\n", "Step 1: New\n"],
            SegmentOptions::default(),
        );
        assert_eq!(steps, vec![step("1", &["New"])]);
    }

    #[test]
    fn test_empty_page() {
        assert!(run("42-02", &[], SegmentOptions::default()).is_empty());
    }

    #[test]
    fn test_is_caption() {
        assert!(is_caption("FIGURE 3\n"));
        assert!(is_caption("F-1204A"));
        assert!(!is_caption("Figure 3"));
        assert!(!is_caption("3/32\n"));
        assert!(!is_caption(""));
    }

    #[test]
    fn test_split_step_marker() {
        let (n, rest) = split_step_marker("Step 12: Rivet the skin").unwrap();
        assert_eq!(n.as_str(), "12");
        assert_eq!(rest, "Rivet the skin");
        assert!(split_step_marker("See Step 12: above").is_none());
        assert!(split_step_marker("step 1: lower case").is_none());
    }
}
