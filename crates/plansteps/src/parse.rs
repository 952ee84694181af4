use std::path::{Path, PathBuf};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pdf::PageText;
use plansteps_core::ordering::KeyOrder;
use plansteps_core::plans::{parse_pages, ParseConfig, ParseReport};
use plansteps_core::selection::PageSelection;
use plansteps_core::steps::{FirstPagePolicy, TrailingStep};
use plansteps_core::types::{RawPage, StepDocument};

use crate::prelude::{eprintln, println, *};

#[derive(Debug, Clone, clap::Args)]
pub struct ParseOptions {
    /// Path to the plans PDF
    pub input: PathBuf,

    /// Append the extracted steps to this CSV file
    #[arg(short, long, env = "PLANSTEPS_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Page or page range to parse, 1-based (e.g. "5" or "12-20")
    #[arg(short, long, env = "PLANSTEPS_PAGES")]
    pub pages: Option<PageSelection>,

    /// Report pages that were dropped, with their extracted text
    #[arg(short, long, env = "PLANSTEPS_DEBUG", default_value = "false")]
    pub debug: bool,

    /// Print the extracted steps as tables
    #[arg(long)]
    pub print: bool,

    /// Skip step extraction on the first page of each section (labels ending in -01)
    #[arg(long)]
    pub skip_first_pages: bool,

    /// Discard a step still open at the end of a page instead of keeping it
    #[arg(long)]
    pub drop_trailing_step: bool,

    /// Sort labels and step numbers as plain strings ("10" before "2")
    #[arg(long)]
    pub lexical_sort: bool,

    /// Print the extracted steps as JSON
    #[arg(long)]
    pub json: bool,
}

impl ParseOptions {
    pub fn config(&self) -> ParseConfig {
        ParseConfig {
            verbose_errors: self.debug,
            print_results: self.print,
            first_page: if self.skip_first_pages {
                FirstPagePolicy::SkipSectionFirstPage
            } else {
                FirstPagePolicy::ProcessAll
            },
            trailing_step: if self.drop_trailing_step {
                TrailingStep::Discard
            } else {
                TrailingStep::Flush
            },
            key_order: if self.lexical_sort {
                KeyOrder::Lexical
            } else {
                KeyOrder::Natural
            },
        }
    }

    pub fn selection(&self) -> PageSelection {
        self.pages.unwrap_or_default()
    }
}

/// Read the PDF and pull text fragments for the selected pages.
///
/// Layout runs on a blocking thread behind a spinner.
pub async fn extract_text(input: &Path, selection: PageSelection) -> Result<Vec<PageText>> {
    let bytes = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner.set_message(format!(
        "Extracting text from {} ({})",
        input.display(),
        selection
    ));

    let extracted = tokio::task::spawn_blocking(move || {
        let document = pdf::PlansDocument::from_bytes(&bytes)?;
        let page_count = document.page_count();
        let indices = selection.zero_based();

        log::debug!("document has {} pages, reading {}", page_count, selection);
        if let Some(range) = &indices {
            if range.start >= page_count {
                log::warn!(
                    "{} starts past the last page of the document ({})",
                    selection,
                    page_count
                );
            }
        }

        Ok::<_, pdf::PdfError>(document.pages(indices))
    })
    .await?;

    spinner.finish_and_clear();

    let pages = extracted.map_err(|e| Error::Extraction {
        path: input.display().to_string(),
        reason: e.to_string(),
    })?;

    log::debug!("extracted {} pages from {}", pages.len(), input.display());
    Ok(pages)
}

/// Extract and parse a plans PDF without writing any output.
pub async fn parse_file(options: &ParseOptions) -> Result<ParseReport> {
    let pages = extract_text(&options.input, options.selection()).await?;
    let raw_pages = pages
        .into_iter()
        .map(|page| RawPage::new(page.number, page.fragments));

    let config = options.config();
    let report = parse_pages(raw_pages, &config);
    log_report(&report, &config);

    Ok(report)
}

fn log_report(report: &ParseReport, config: &ParseConfig) {
    for dropped in &report.dropped {
        if config.verbose_errors {
            log::warn!(
                "page {}: {}, text found:\n{:#?}",
                dropped.number,
                dropped.reason,
                dropped.fragments
            );
        } else {
            log::debug!("page {}: {}", dropped.number, dropped.reason);
        }
    }

    for label in &report.overwritten {
        if config.verbose_errors {
            log::warn!("label {} found on more than one page, keeping the last", label);
        } else {
            log::debug!("label {} overwritten", label);
        }
    }

    for (label, steps) in &report.document.pages {
        log::debug!("page {}: {} steps", label, steps.len());
    }
}

fn print_results(document: &StepDocument, order: KeyOrder) {
    for label in document.labels(order) {
        println!("{} {}", "PAGE".bold().cyan(), label.as_str().bold());

        let steps = document.steps(label, order);
        if steps.is_empty() {
            println!("  {}", "No steps found".bright_black());
            println!();
            continue;
        }

        let mut table = new_table();
        table.add_row(prettytable::row!["Step".bold().cyan(), "Text".bold().cyan()]);
        for (number, text) in steps {
            table.add_row(prettytable::row![
                number.as_str().green(),
                text.joined().bright_white()
            ]);
        }
        table.printstd();
        println!();
    }
}

pub async fn run(options: ParseOptions, _global: crate::Global) -> Result<()> {
    let config = options.config();
    let report = parse_file(&options).await?;
    let records = report.document.records(config.key_order);

    if config.print_results {
        print_results(&report.document, config.key_order);
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }

    if let Some(output) = &options.output {
        let written = crate::sink::append_records(output, &records)?;
        eprintln!(
            "{} {} rows to {}",
            "Wrote".green(),
            written,
            output.display()
        );
    }

    eprintln!(
        "{} {} steps on {} pages ({} dropped)",
        "Parsed".green().bold(),
        report.document.step_count(),
        report.document.pages.len(),
        report.dropped.len()
    );

    Ok(())
}
