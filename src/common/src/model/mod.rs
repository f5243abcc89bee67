pub mod log_entry;
pub mod series;
pub mod span;
pub mod trace;

pub use log_entry::LogRecord;
pub use series::{ExtractedSeries, IntervalCount, RawSample, RawSeries, SampleOrder};
pub use span::{SpanKind, SpanRecord};
pub use trace::TraceRecord;
