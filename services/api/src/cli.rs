use crate::demo::{run_calendar_report, run_demo, CalendarReportArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use compliance_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Agentic Compliance Orchestrator",
    about = "Demonstrate and run the Agentic Compliance Orchestrator from the command line",
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
    /// Generate a compliance calendar report for stakeholder demos
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },
    /// Run an end-to-end CLI demo covering the deadline and reminder pipeline
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CalendarCommand {
    /// Materialize a calendar for one entity and print the report
    Report(CalendarReportArgs),
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
        Command::Calendar {
            command: CalendarCommand::Report(args),
        } => run_calendar_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
