use std::path::PathBuf;

use plansteps_core::label::resolve_label;
use plansteps_core::selection::PageSelection;
use serde::Serialize;

use crate::prelude::{println, *};

#[derive(Debug, Clone, clap::Args)]
pub struct PagesOptions {
    /// Path to the plans PDF
    pub input: PathBuf,

    /// Page or page range to dump, 1-based (e.g. "5" or "12-20")
    #[arg(short, long, env = "PLANSTEPS_PAGES")]
    pub pages: Option<PageSelection>,
}

/// One physical page as the extractor sees it.
#[derive(Debug, Serialize)]
pub struct PageDump {
    pub number: usize,
    /// Label the page would be filed under, if any.
    pub label: Option<String>,
    pub fragments: Vec<String>,
}

impl From<pdf::PageText> for PageDump {
    fn from(page: pdf::PageText) -> Self {
        Self {
            number: page.number,
            label: resolve_label(&page.fragments).map(|label| label.to_string()),
            fragments: page.fragments,
        }
    }
}

pub async fn run(options: PagesOptions, _global: crate::Global) -> Result<()> {
    let pages = crate::parse::extract_text(&options.input, options.pages.unwrap_or_default()).await?;
    let dump: Vec<PageDump> = pages.into_iter().map(PageDump::from).collect();

    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}
