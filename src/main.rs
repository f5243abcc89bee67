mod commands;
mod render;

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::Configuration;
use common::cli::{CommonArgs, CommonCommands, utils};
use gcp_client::GcpClient;

use commands::Failures;
use commands::logs::LogsArgs;
use commands::metrics::MetricsArgs;
use commands::traces::TracesArgs;
use render::{ConsoleRenderer, OutputFormat};

#[derive(Parser)]
#[command(name = "cloudpeek")]
#[command(about = "Poll recent logs, metrics and traces of a Google Cloud project")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[arg(long, global = true, help = "Also print intervals with a zero count")]
    show_empty: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Recent logs, then metrics, then traces
    All,
    /// Most recent entries of a log
    Logs(LogsArgs),
    /// Per-interval counts of cumulative metrics
    Metrics(MetricsArgs),
    /// Most recent traces
    Traces(TracesArgs),
    #[command(flatten)]
    Common(CommonCommands),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on CLI arguments
    utils::init_logging(&cli.common);

    let config = utils::load_config(cli.common.config.as_ref())?;

    let command = cli.command.unwrap_or(Command::All);
    if let Command::Common(ref common_cmd) = command {
        return utils::handle_common_command(common_cmd, &config);
    }

    utils::validate_config(&config)?;
    let client = GcpClient::from_config(&config)
        .await
        .context("Failed to connect to Google Cloud")?;
    log::info!("Polling project {}", client.project_id());

    let stdout = std::io::stdout().lock();
    let mut renderer = ConsoleRenderer::new(stdout, cli.format).show_empty(cli.show_empty);

    let failures = poll(&client, &config, command, &mut renderer).await?;
    renderer.flush().context("Failed to flush output")?;
    log::debug!("Polling done, {} signal(s) failed", failures.failed().len());

    failures.into_result()
}

async fn poll<W: Write>(
    client: &GcpClient,
    config: &Configuration,
    command: Command,
    renderer: &mut ConsoleRenderer<W>,
) -> Result<Failures> {
    let mut failures = Failures::default();

    match command {
        Command::All => {
            let query = commands::logs::query(&config.logs, &LogsArgs::default());
            failures.extend(commands::logs::run(client, &query, renderer).await?);

            let queries = commands::metrics::queries(&config.metrics, &MetricsArgs::default());
            failures.extend(commands::metrics::run(client, &queries, renderer).await?);

            let query = commands::traces::query(&config.traces, &TracesArgs::default());
            failures.extend(commands::traces::run(client, &query, renderer).await?);
        }
        Command::Logs(args) => {
            let query = commands::logs::query(&config.logs, &args);
            failures.extend(commands::logs::run(client, &query, renderer).await?);
        }
        Command::Metrics(args) => {
            let queries = commands::metrics::queries(&config.metrics, &args);
            failures.extend(commands::metrics::run(client, &queries, renderer).await?);
        }
        Command::Traces(args) => {
            let query = commands::traces::query(&config.traces, &args);
            failures.extend(commands::traces::run(client, &query, renderer).await?);
        }
        Command::Common(_) => {}
    }

    Ok(failures)
}
