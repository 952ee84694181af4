//! Page range selection.
//!
//! Users name physical pages 1-based (`5`, `2-3`); the extraction layer wants
//! 0-based indices.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    #[default]
    All,
    /// A single 1-based page.
    Single(usize),
    /// An inclusive 1-based range.
    Range(usize, usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Invalid page number '{0}'")]
    NotANumber(String),
    #[error("Page numbers start at 1")]
    ZeroPage,
    #[error("Page range {0}-{1} ends before it starts")]
    Reversed(usize, usize),
}

fn parse_page(token: &str) -> Result<usize, SelectionError> {
    let page = token
        .trim()
        .parse::<usize>()
        .map_err(|_| SelectionError::NotANumber(token.to_string()))?;
    if page == 0 {
        return Err(SelectionError::ZeroPage);
    }
    Ok(page)
}

impl PageSelection {
    /// Parse `N` or `A-B`.
    ///
    /// Input that splits into anything other than one or two tokens selects
    /// every page.
    pub fn parse(input: &str) -> Result<Self, SelectionError> {
        let tokens: Vec<&str> = input.split('-').collect();
        match tokens.as_slice() {
            [page] => Ok(PageSelection::Single(parse_page(page)?)),
            [start, end] => {
                let start = parse_page(start)?;
                let end = parse_page(end)?;
                if start > end {
                    return Err(SelectionError::Reversed(start, end));
                }
                Ok(PageSelection::Range(start, end))
            }
            _ => Ok(PageSelection::All),
        }
    }

    /// 0-based page index range, or `None` for every page.
    pub fn zero_based(&self) -> Option<Range<usize>> {
        match *self {
            PageSelection::All => None,
            PageSelection::Single(page) => Some(page - 1..page),
            PageSelection::Range(start, end) => Some(start - 1..end),
        }
    }
}

impl FromStr for PageSelection {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageSelection::parse(s)
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::All => write!(f, "all pages"),
            PageSelection::Single(page) => write!(f, "page {}", page),
            PageSelection::Range(start, end) => write!(f, "pages {}-{}", start, end),
        }
    }
}
