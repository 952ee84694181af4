//! Question-and-answer front end for `parse`.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use plansteps_core::selection::PageSelection;

use crate::parse::ParseOptions;
use crate::prelude::*;

const RULE: &str = "--------------------------------------------";

/// Settings collected from the prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers {
    pub input: PathBuf,
    pub pages: PageSelection,
    pub output: Option<PathBuf>,
    pub show_errors: bool,
    pub print_results: bool,
}

impl From<Answers> for ParseOptions {
    fn from(answers: Answers) -> Self {
        Self {
            input: answers.input,
            output: answers.output,
            pages: Some(answers.pages),
            debug: answers.show_errors,
            print: answers.print_results,
            skip_first_pages: false,
            drop_trailing_step: false,
            lexical_sort: false,
            json: false,
        }
    }
}

fn prompt<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, question: &str) -> Result<String, Error> {
    writeln!(writer, "------> {}\n\t", question).map_err(|e| Error::Prompt(e.to_string()))?;
    writer.flush().map_err(|e| Error::Prompt(e.to_string()))?;

    let mut answer = String::new();
    let read = reader
        .read_line(&mut answer)
        .map_err(|e| Error::Prompt(e.to_string()))?;
    if read == 0 {
        return Err(Error::Prompt("input ended before all questions were answered".to_string()));
    }

    Ok(answer.trim().to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_lowercase().as_str(), "yes" | "y")
}

/// Ask for every setting `parse` needs.
pub fn ask<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<Answers, Error> {
    writeln!(writer, "Plans PDF step extractor\n{}\nSettings:", RULE)
        .map_err(|e| Error::Prompt(e.to_string()))?;

    let input = prompt(reader, writer, "What is the path of the PDF file you would like to parse?")?;
    if input.is_empty() {
        return Err(Error::Prompt("a PDF path is required".to_string()));
    }

    let pages = prompt(
        reader,
        writer,
        "What page/page range would you like to parse (type range A-B or press enter for all pages)?",
    )?;
    let pages = if pages.is_empty() {
        PageSelection::All
    } else {
        PageSelection::parse(&pages).map_err(|e| Error::Prompt(e.to_string()))?
    };

    let output = prompt(
        reader,
        writer,
        "Would you like to output to a CSV? If yes, what is the path? If no, press enter.",
    )?;
    let show_errors = prompt(reader, writer, "Would you like the errors printed to the console?")?;
    let print_results = prompt(reader, writer, "Would you like the results printed to the console?")?;

    writeln!(writer, "{}", RULE).map_err(|e| Error::Prompt(e.to_string()))?;

    Ok(Answers {
        input: PathBuf::from(input),
        pages,
        output: (!output.is_empty()).then(|| PathBuf::from(output)),
        show_errors: is_yes(&show_errors),
        print_results: is_yes(&print_results),
    })
}

pub async fn run(global: crate::Global) -> Result<()> {
    let answers = {
        let stdin = std::io::stdin();
        let mut reader = stdin.lock();
        let mut writer = std::io::stdout();
        ask(&mut reader, &mut writer)?
    };

    log::debug!("interactive answers: {:?}", answers);
    crate::parse::run(answers.into(), global).await
}
