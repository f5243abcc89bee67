use std::io::Write;

use anyhow::Context;
use clap::Args;
use common::config::TracesConfig;
use common::source::{TraceQuery, TraceSource};

use super::Failures;
use crate::render::ConsoleRenderer;

#[derive(Args, Debug, Clone, Default)]
pub struct TracesArgs {
    /// Number of most recent traces to show. Defaults to `traces.limit`
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn query(config: &TracesConfig, args: &TracesArgs) -> TraceQuery {
    TraceQuery {
        limit: args.limit.unwrap_or(config.limit),
        lookback: config.lookback,
    }
}

pub async fn run<W: Write>(
    source: &dyn TraceSource,
    query: &TraceQuery,
    renderer: &mut ConsoleRenderer<W>,
) -> anyhow::Result<Failures> {
    let mut failures = Failures::default();

    match source.recent(query).await {
        Ok(traces) => {
            if traces.is_empty() {
                log::info!("No traces found");
            }
            for trace in &traces {
                renderer
                    .trace(trace)
                    .context("Failed to write trace output")?;
            }
        }
        Err(e) => failures.record("traces", &e),
    }

    Ok(failures)
}
