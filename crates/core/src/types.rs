use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ordering::{compare_keys, KeyOrder};

/// Logical page label printed on a plans page, e.g. `42A-16`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the label names the first page of a section (`16-01`, `7-1`).
    pub fn is_section_first_page(&self) -> bool {
        self.0.ends_with("-01") || self.0.ends_with("-1")
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Step number as it appears after `Step ` in the text (one or two digits).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepNumber(String);

impl StepNumber {
    pub fn new(number: impl Into<String>) -> Self {
        StepNumber(number.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered text fragments belonging to a single step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepText(Vec<String>);

impl StepText {
    pub fn new(fragments: Vec<String>) -> Self {
        StepText(fragments)
    }

    pub fn fragments(&self) -> &[String] {
        &self.0
    }

    /// Fragments separated by a blank line, outer whitespace trimmed.
    pub fn joined(&self) -> String {
        self.0.join("\n\n").trim().to_string()
    }
}

/// One physical page as handed over by the extraction layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPage {
    /// 1-based physical page number in the source document.
    pub number: usize,
    pub fragments: Vec<String>,
}

impl RawPage {
    pub fn new(number: usize, fragments: Vec<String>) -> Self {
        RawPage { number, fragments }
    }
}

/// Steps found on a single labelled page.
pub type PageSteps = BTreeMap<StepNumber, StepText>;

/// Every labelled page with its steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDocument {
    pub pages: BTreeMap<Label, PageSteps>,
}

impl StepDocument {
    pub fn step_count(&self) -> usize {
        self.pages.values().map(BTreeMap::len).sum()
    }

    /// Labels in the requested order.
    pub fn labels(&self, order: KeyOrder) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self.pages.keys().collect();
        labels.sort_by(|a, b| compare_keys(a.as_str(), b.as_str(), order));
        labels
    }

    /// Steps of one page in the requested order.
    pub fn steps(&self, label: &Label, order: KeyOrder) -> Vec<(&StepNumber, &StepText)> {
        let mut steps: Vec<_> = self
            .pages
            .get(label)
            .map(|steps| steps.iter().collect())
            .unwrap_or_default();
        steps.sort_by(|(a, _), (b, _)| compare_keys(a.as_str(), b.as_str(), order));
        steps
    }

    /// Flatten into one row per step, sorted by label then step number.
    pub fn records(&self, order: KeyOrder) -> Vec<StepRecord> {
        self.labels(order)
            .into_iter()
            .flat_map(|label| {
                self.steps(label, order)
                    .into_iter()
                    .map(move |(step, text)| StepRecord {
                        page: label.to_string(),
                        step: step.to_string(),
                        text: text.joined(),
                    })
            })
            .collect()
    }
}

/// A flattened output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub page: String,
    pub step: String,
    pub text: String,
}

/// Why a physical page did not make it into the [`StepDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The extraction layer produced no text for the page.
    NoText,
    /// No fragment matched the label grammar.
    NoLabel,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::NoText => write!(f, "no text could be extracted"),
            DropReason::NoLabel => write!(f, "page number not found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedPage {
    pub number: usize,
    pub reason: DropReason,
    pub fragments: Vec<String>,
}
