use crate::demo::{
    run_anomaly_sweep, run_demo, run_performance_report, AnomalySweepArgs, DemoArgs,
    PerformanceReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use workforce_ops::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Workforce Performance Engine",
    about = "Run the workforce scoring and anomaly detection service from the command line",
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
    /// Performance scoring over a seeded demo company
    Performance {
        #[command(subcommand)]
        command: PerformanceCommand,
    },
    /// Anomaly detection over a seeded demo company
    Anomaly {
        #[command(subcommand)]
        command: AnomalyCommand,
    },
    /// Run an end-to-end demo covering attendance, leave, scoring, and detection
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PerformanceCommand {
    /// Calculate and render composite scores for the demo company
    Report(PerformanceReportArgs),
}

#[derive(Subcommand, Debug)]
enum AnomalyCommand {
    /// Run the anomaly sweep and render the daily report
    Run(AnomalySweepArgs),
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
        Command::Performance {
            command: PerformanceCommand::Report(args),
        } => run_performance_report(args),
        Command::Anomaly {
            command: AnomalyCommand::Run(args),
        } => run_anomaly_sweep(args),
        Command::Demo(args) => run_demo(args),
    }
}
