//! Core library for plansteps
//!
//! This crate implements the **Functional Core** of the plansteps application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`plansteps_core`** (this crate): Pure transformation functions with zero I/O
//! - **`pdf`**: PDF loading and per-page text fragment extraction
//! - **`plansteps`**: CLI, logging, and CSV output (the Imperative Shell)
//!
//! Everything here works on text that has already been pulled out of the PDF,
//! so it can be tested with plain string fixtures.
//!
//! # Module Organization
//!
//! - [`label`]: Recovering the printed page label (`42A-16`) from a page's fragments
//! - [`steps`]: Splitting a labelled page into `Step N:` runs
//! - [`plans`]: The page-to-steps pipeline and its configuration
//! - [`ordering`]: Natural ordering of labels and step numbers
//! - [`selection`]: 1-based page range parsing
//! - [`types`]: Shared domain types
//!
//! # Example Usage
//!
//! ```rust
//! use plansteps_core::plans::{parse_pages, ParseConfig};
//! use plansteps_core::types::RawPage;
//! use plansteps_core::ordering::KeyOrder;
//!
//! let pages = vec![RawPage::new(
//!     1,
//!     vec![
//!         "PAGE 42-02\n".to_string(),
//!         "Step 1: Remove panel\n".to_string(),
//!     ],
//! )];
//!
//! let report = parse_pages(pages, &ParseConfig::default());
//! let records = report.document.records(KeyOrder::Natural);
//!
//! assert_eq!(records[0].page, "42-02");
//! assert_eq!(records[0].text, "Remove panel");
//! ```

pub mod label;
pub mod ordering;
pub mod plans;
pub mod selection;
pub mod steps;
pub mod types;
