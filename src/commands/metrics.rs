use std::io::Write;

use anyhow::Context;
use clap::Args;
use common::config::MetricsConfig;
use common::source::{SeriesQuery, SeriesSource};

use super::Failures;
use crate::render::ConsoleRenderer;

#[derive(Args, Debug, Clone, Default)]
pub struct MetricsArgs {
    /// Metric type to poll, repeatable. Defaults to `metrics.types`
    #[arg(long = "metric", value_name = "TYPE")]
    pub metrics: Vec<String>,

    /// Only series whose subject_id label has this value
    #[arg(long, value_name = "ID")]
    pub subject: Option<String>,
}

/// One query per metric type, in configuration order.
pub fn queries(config: &MetricsConfig, args: &MetricsArgs) -> Vec<SeriesQuery> {
    let types = if args.metrics.is_empty() {
        &config.types
    } else {
        &args.metrics
    };
    let subject = args.subject.clone().or_else(|| config.subject.clone());

    types
        .iter()
        .map(|metric_type| SeriesQuery {
            metric_type: metric_type.clone(),
            subject_filter: subject.clone(),
            lookback: config.lookback,
        })
        .collect()
}

/// Fetch, extract and render every query. A failing metric type is recorded
/// and the remaining ones are still polled.
pub async fn run<W: Write>(
    source: &dyn SeriesSource,
    queries: &[SeriesQuery],
    renderer: &mut ConsoleRenderer<W>,
) -> anyhow::Result<Failures> {
    let mut failures = Failures::default();
    if queries.is_empty() {
        log::warn!("No metric types configured (set metrics.types or pass --metric)");
        return Ok(failures);
    }

    for query in queries {
        let series = match source.fetch(query).await {
            Ok(series) => series,
            Err(e) => {
                failures.record(format!("metric {}", query.metric_type), &e);
                continue;
            }
        };

        if series.is_empty() {
            log::info!("No time series found for {}", query.metric_type);
        }
        for raw in series {
            let extracted = delta::extract(raw, source.order());
            log::debug!(
                "{} subject={:?}: {} intervals, {} events",
                extracted.metric_type,
                extracted.subject_id,
                extracted.intervals.len(),
                extracted.total()
            );
            renderer
                .series(&extracted)
                .context("Failed to write metric output")?;
        }
    }

    Ok(failures)
}
