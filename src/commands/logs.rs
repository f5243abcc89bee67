use std::io::Write;

use anyhow::Context;
use clap::Args;
use common::config::LogsConfig;
use common::source::{LogQuery, LogSource};

use super::Failures;
use crate::render::ConsoleRenderer;

#[derive(Args, Debug, Clone, Default)]
pub struct LogsArgs {
    /// Log to read. Defaults to `logs.name`
    #[arg(long, value_name = "NAME")]
    pub log_name: Option<String>,

    /// Number of most recent entries to show. Defaults to `logs.limit`
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn query(config: &LogsConfig, args: &LogsArgs) -> LogQuery {
    LogQuery {
        log_name: args.log_name.clone().unwrap_or_else(|| config.name.clone()),
        lookback: config.lookback,
        limit: args.limit.unwrap_or(config.limit),
    }
}

pub async fn run<W: Write>(
    source: &dyn LogSource,
    query: &LogQuery,
    renderer: &mut ConsoleRenderer<W>,
) -> anyhow::Result<Failures> {
    let mut failures = Failures::default();
    if query.log_name.is_empty() {
        log::warn!("No log name configured (set logs.name or pass --log-name)");
        return Ok(failures);
    }

    match source.recent(query).await {
        Ok(entries) => {
            if entries.is_empty() {
                log::info!(
                    "No entries in {} within the last {:?}",
                    query.log_name,
                    query.lookback
                );
            }
            for entry in &entries {
                renderer
                    .log_entry(entry)
                    .context("Failed to write log output")?;
            }
        }
        Err(e) => failures.record(format!("log {}", query.log_name), &e),
    }

    Ok(failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::OutputFormat;
    use async_trait::async_trait;
    use common::SourceError;
    use common::model::LogRecord;

    struct FakeLogs(Result<Vec<LogRecord>, SourceError>);

    #[async_trait]
    impl LogSource for FakeLogs {
        async fn recent(&self, query: &LogQuery) -> Result<Vec<LogRecord>, SourceError> {
            self.0
                .clone()
                .map(|entries| entries.into_iter().take(query.limit).collect())
        }
    }

    fn record(payload: &str) -> LogRecord {
        LogRecord {
            timestamp: None,
            severity: "INFO".to_string(),
            log_name: "projects/demo/logs/app".to_string(),
            payload: payload.to_string(),
            labels: Default::default(),
        }
    }

    #[test]
    fn test_query_overrides() {
        let config = LogsConfig::default();
        let q = query(&config, &LogsArgs::default());
        assert_eq!(q.log_name, config.name);
        assert_eq!(q.limit, config.limit);

        let args = LogsArgs {
            log_name: Some("audit".to_string()),
            limit: Some(20),
        };
        let q = query(&config, &args);
        assert_eq!(q.log_name, "audit");
        assert_eq!(q.limit, 20);
        assert_eq!(q.lookback, config.lookback);
    }

    fn app_query() -> LogQuery {
        let args = LogsArgs {
            log_name: Some("app".to_string()),
            limit: None,
        };
        query(&LogsConfig::default(), &args)
    }

    #[tokio::test]
    async fn test_run_renders_entries_in_order() {
        let source = FakeLogs(Ok(vec![record("second"), record("first")]));
        let mut renderer = ConsoleRenderer::new(Vec::new(), OutputFormat::Text);

        let failures = run(&source, &app_query(), &mut renderer).await.unwrap();

        assert!(failures.is_empty());
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "- INFO projects/demo/logs/app: second",
                "- INFO projects/demo/logs/app: first"
            ]
        );
    }

    #[tokio::test]
    async fn test_run_records_failure() {
        let source = FakeLogs(Err(SourceError::Auth("denied".to_string())));
        let mut renderer = ConsoleRenderer::new(Vec::new(), OutputFormat::Text);

        let failures = run(&source, &app_query(), &mut renderer).await.unwrap();

        assert_eq!(failures.failed(), ["log app".to_string()]);
        assert!(renderer.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_missing_log_name_is_skipped() {
        let source = FakeLogs(Err(SourceError::Auth("unreachable".to_string())));
        let mut renderer = ConsoleRenderer::new(Vec::new(), OutputFormat::Text);
        let q = query(&LogsConfig::default(), &LogsArgs::default());

        let failures = run(&source, &q, &mut renderer).await.unwrap();

        assert!(failures.is_empty());
    }
}
