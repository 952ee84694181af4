use crate::prelude::*;
use clap::Parser;

mod error;
mod interactive;
mod pages;
mod parse;
mod prelude;
mod sink;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Extract numbered build steps from aircraft kit plans PDFs"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "PLANSTEPS_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Extract steps from a plans PDF
    Parse(crate::parse::ParseOptions),

    /// Dump the raw text fragments of each page as JSON
    Pages(crate::pages::PagesOptions),

    /// Prompt for the parse settings
    Interactive,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();

    init_logging(app.global.verbose);
    color_eyre::install()?;

    match app.command {
        SubCommands::Parse(options) => crate::parse::run(options, app.global).await,
        SubCommands::Pages(options) => crate::pages::run(options, app.global).await,
        SubCommands::Interactive => crate::interactive::run(app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
