use crate::demo::{run_demo, run_schemas, DemoArgs, SchemasArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use society::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Society Records",
    about = "Serve and inspect residential society records from the command line",
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
    /// Print the registered record schemas
    Schemas(SchemasArgs),
    /// Walk through a visitor check-in/check-out and a complaint against an in-memory store
    Demo(DemoArgs),
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
        Command::Schemas(args) => run_schemas(args),
        Command::Demo(args) => run_demo(args),
    }
}
