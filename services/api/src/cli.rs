use crate::demo::{run_demo, run_rank, run_template_listing, DemoArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use contest_ranker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Contest Ranker",
    about = "Rank competition entries against hierarchical criteria from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank entries loaded from a CSV or JSON file
    Rank(RankArgs),
    /// Inspect stored criteria templates
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },
    /// Rank a built-in sample of entries and print the breakdown
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TemplatesCommand {
    /// List the built-in template and any templates from RANKING_TEMPLATES_PATH
    List,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Rank(args) => run_rank(args),
        Command::Templates {
            command: TemplatesCommand::List,
        } => run_template_listing(),
        Command::Demo(args) => run_demo(args),
    }
}
