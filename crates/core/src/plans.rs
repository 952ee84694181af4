//! Page-to-steps pipeline over already extracted page text.
//!
//! ```text
//! RawPage[] -> identify_pages -> Label => RawPage -> segment -> StepDocument
//!                  |
//!                  +-> DroppedPage[] (no text / no label)
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::label::resolve_label;
use crate::ordering::KeyOrder;
use crate::steps::{segment, FirstPagePolicy, SegmentOptions, TrailingStep};
use crate::types::{DropReason, DroppedPage, Label, RawPage, StepDocument};

/// Settings for one parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Report dropped pages with their fragments.
    pub verbose_errors: bool,
    /// Print the parsed steps after the run.
    pub print_results: bool,
    pub first_page: FirstPagePolicy,
    pub trailing_step: TrailingStep,
    pub key_order: KeyOrder,
}

impl ParseConfig {
    pub fn segment_options(&self) -> SegmentOptions {
        SegmentOptions {
            first_page: self.first_page,
            trailing_step: self.trailing_step,
        }
    }
}

/// Labelled pages plus everything that was set aside on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifiedPages {
    pub pages: BTreeMap<Label, RawPage>,
    pub dropped: Vec<DroppedPage>,
    /// Labels seen on more than one physical page; the last page kept.
    pub overwritten: Vec<Label>,
}

/// Outcome of a parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseReport {
    pub document: StepDocument,
    pub dropped: Vec<DroppedPage>,
    pub overwritten: Vec<Label>,
}

/// Key every page by its label, in physical page order.
pub fn identify_pages(pages: impl IntoIterator<Item = RawPage>) -> IdentifiedPages {
    let mut identified = IdentifiedPages::default();

    for page in pages {
        if page.fragments.is_empty() {
            identified.dropped.push(DroppedPage {
                number: page.number,
                reason: DropReason::NoText,
                fragments: page.fragments,
            });
            continue;
        }

        match resolve_label(&page.fragments) {
            Some(label) => {
                if identified.pages.contains_key(&label) {
                    identified.overwritten.push(label.clone());
                }
                identified.pages.insert(label, page);
            }
            None => identified.dropped.push(DroppedPage {
                number: page.number,
                reason: DropReason::NoLabel,
                fragments: page.fragments,
            }),
        }
    }

    identified
}

/// Run label resolution and step segmentation over every page.
pub fn parse_pages(pages: impl IntoIterator<Item = RawPage>, config: &ParseConfig) -> ParseReport {
    let IdentifiedPages {
        pages,
        dropped,
        overwritten,
    } = identify_pages(pages);

    let options = config.segment_options();
    let document = StepDocument {
        pages: pages
            .iter()
            .map(|(label, page)| (label.clone(), segment(label, &page.fragments, &options)))
            .collect(),
    };

    ParseReport {
        document,
        dropped,
        overwritten,
    }
}
