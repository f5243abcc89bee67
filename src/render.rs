//! Console output for extracted series, log entries and traces.

use std::io::{self, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use common::model::{ExtractedSeries, LogRecord, TraceRecord};
use serde::Serialize;

const DELIMITER: &str = "-------------------";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable blocks and lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

pub struct ConsoleRenderer<W: Write> {
    out: W,
    format: OutputFormat,
    show_empty: bool,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            show_empty: false,
        }
    }

    /// Also print intervals with a zero count.
    pub fn show_empty(mut self, show_empty: bool) -> Self {
        self.show_empty = show_empty;
        self
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn series(&mut self, series: &ExtractedSeries) -> io::Result<()> {
        let show_empty = self.show_empty;
        let intervals = series
            .intervals
            .iter()
            .filter(move |i| show_empty || i.count != 0);

        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "{DELIMITER}")?;
                writeln!(self.out, "Metric Type: {}", series.metric_type)?;
                if !series.subject_id.is_empty() {
                    writeln!(
                        self.out,
                        "Subject ID: {}, Subject Type: {}",
                        series.subject_id, series.subject_type
                    )?;
                }
                for interval in intervals {
                    writeln!(
                        self.out,
                        "Start Time: {}, End Time: {}, Count: {}",
                        rfc3339(interval.start),
                        rfc3339(interval.end),
                        interval.count
                    )?;
                }
                writeln!(self.out, "{DELIMITER}")
            }
            OutputFormat::Json => {
                let series = ExtractedSeries {
                    intervals: intervals.cloned().collect(),
                    ..series.clone()
                };
                self.json_line(&series)
            }
        }
    }

    pub fn log_entry(&mut self, record: &LogRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                let timestamp = record
                    .timestamp
                    .map(rfc3339)
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    self.out,
                    "{timestamp} {} {}: {}",
                    record.severity, record.log_name, record.payload
                )
            }
            OutputFormat::Json => self.json_line(record),
        }
    }

    pub fn trace(&mut self, trace: &TraceRecord) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => {
                let root = trace.root_span().map(|s| s.name.as_str()).unwrap_or("-");
                writeln!(
                    self.out,
                    "trace {} ({} spans) root={root} duration={}ms",
                    trace.trace_id,
                    trace.spans.len(),
                    trace.duration_ms()
                )
            }
            OutputFormat::Json => self.json_line(trace),
        }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn json_line<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, value)?;
        writeln!(self.out)
    }
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
