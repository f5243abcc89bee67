//! Delta extraction for cumulative metric samples.
//!
//! Distribution and cumulative metrics report a running total for a window
//! that may still be open when polled. Two consecutive samples with the same
//! `interval_start` therefore overlap, and summing their values counts every
//! event of the shared prefix twice. [`extract`] turns such a series into
//! disjoint intervals:
//!
//! * the oldest sample is emitted as-is,
//! * a sample that reports on the same window as the sample before it becomes
//!   the slice between the two reports, counting `current - previous` events,
//! * a sample that opens a new window is emitted as-is.
//!
//! ```text
//! newest first in:  [T0..T0+10m = 50] [T0..T0+5m = 20]
//! oldest first out: [T0..T0+5m  = 20] [T0+5m..T0+10m = 30]
//! ```
//!
//! Counts are not clamped: a running total that goes down (counter reset)
//! yields a negative count.

use common::model::{ExtractedSeries, IntervalCount, RawSample, RawSeries, SampleOrder};

/// Convert a raw series into per-interval counts, oldest interval first.
///
/// `order` declares how `series.samples` is sorted; samples are never
/// re-sorted by timestamp. Exactly one interval is produced per sample.
pub fn extract(series: RawSeries, order: SampleOrder) -> ExtractedSeries {
    let intervals = intervals(&series.samples, order);
    let RawSeries {
        metric_type,
        subject_id,
        subject_type,
        ..
    } = series;

    ExtractedSeries {
        subject_id,
        subject_type,
        metric_type,
        intervals,
    }
}

/// Same as [`extract`], leaving the input untouched.
pub fn extract_ref(series: &RawSeries, order: SampleOrder) -> ExtractedSeries {
    ExtractedSeries {
        subject_id: series.subject_id.clone(),
        subject_type: series.subject_type.clone(),
        metric_type: series.metric_type.clone(),
        intervals: intervals(&series.samples, order),
    }
}

/// The interval sequence of [`extract`] without the series metadata.
pub fn intervals(samples: &[RawSample], order: SampleOrder) -> Vec<IntervalCount> {
    let chronological: Box<dyn Iterator<Item = &RawSample> + '_> = match order {
        SampleOrder::OldestFirst => Box::new(samples.iter()),
        SampleOrder::NewestFirst => Box::new(samples.iter().rev()),
    };

    let mut out = Vec::with_capacity(samples.len());
    let mut previous: Option<&RawSample> = None;

    for current in chronological {
        let interval = match previous {
            Some(prev) if prev.interval_start == current.interval_start => IntervalCount {
                start: prev.interval_end,
                end: current.interval_end,
                count: current.value.saturating_sub(prev.value),
            },
            _ => verbatim(current),
        };
        out.push(interval);
        previous = Some(current);
    }

    out
}

fn verbatim(sample: &RawSample) -> IntervalCount {
    IntervalCount {
        start: sample.interval_start,
        end: sample.interval_end,
        count: sample.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use common::model::series::{SUBJECT_ID_LABEL, SUBJECT_TYPE_LABEL};

    const METRIC: &str = "custom.googleapis.com/login_latency";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn t1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap()
    }

    fn mins(m: i64) -> Duration {
        Duration::minutes(m)
    }

    fn sample(start: DateTime<Utc>, end: DateTime<Utc>, value: i64) -> RawSample {
        RawSample::new(start, end, value)
    }

    fn interval(start: DateTime<Utc>, end: DateTime<Utc>, count: i64) -> IntervalCount {
        IntervalCount { start, end, count }
    }

    #[test]
    fn test_empty_series_keeps_metadata() {
        for order in [SampleOrder::OldestFirst, SampleOrder::NewestFirst] {
            let out = extract(RawSeries::new(METRIC, vec![]), order);
            assert_eq!(out.metric_type, METRIC);
            assert!(out.subject_id.is_empty());
            assert!(out.subject_type.is_empty());
            assert!(out.intervals.is_empty());
        }
    }

    #[test]
    fn test_single_sample_is_verbatim() {
        let s = sample(t0(), t0() + mins(5), 42);
        for order in [SampleOrder::OldestFirst, SampleOrder::NewestFirst] {
            let out = extract(RawSeries::new(METRIC, vec![s.clone()]), order);
            assert_eq!(out.intervals, vec![interval(t0(), t0() + mins(5), 42)]);
        }
    }

    #[test]
    fn test_same_window_is_diffed() {
        let newest_first = vec![
            sample(t0(), t0() + mins(10), 50),
            sample(t0(), t0() + mins(5), 20),
        ];

        let out = extract(RawSeries::new(METRIC, newest_first), SampleOrder::NewestFirst);

        assert_eq!(
            out.intervals,
            vec![
                interval(t0(), t0() + mins(5), 20),
                interval(t0() + mins(5), t0() + mins(10), 30),
            ]
        );
    }

    #[test]
    fn test_new_window_passes_through() {
        let newest_first = vec![
            sample(t1(), t1() + mins(5), 7),
            sample(t0(), t0() + mins(5), 5),
        ];

        let out = extract(RawSeries::new(METRIC, newest_first), SampleOrder::NewestFirst);

        assert_eq!(
            out.intervals,
            vec![
                interval(t0(), t0() + mins(5), 5),
                interval(t1(), t1() + mins(5), 7),
            ]
        );
    }

    #[test]
    fn test_negative_delta_is_not_clamped() {
        let newest_first = vec![
            sample(t0(), t0() + mins(10), 10),
            sample(t0(), t0() + mins(5), 15),
        ];

        let out = extract(RawSeries::new(METRIC, newest_first), SampleOrder::NewestFirst);

        assert_eq!(out.intervals.len(), 2);
        assert_eq!(out.intervals[1].count, -5);
    }

    #[test]
    fn test_mixed_windows() {
        // Window A: three reports, window B: two reports.
        let oldest_first = vec![
            sample(t0(), t0() + mins(1), 3),
            sample(t0(), t0() + mins(2), 8),
            sample(t0(), t0() + mins(3), 8),
            sample(t1(), t1() + mins(1), 4),
            sample(t1(), t1() + mins(2), 10),
        ];

        let out = extract(RawSeries::new(METRIC, oldest_first), SampleOrder::OldestFirst);

        assert_eq!(
            out.intervals,
            vec![
                interval(t0(), t0() + mins(1), 3),
                interval(t0() + mins(1), t0() + mins(2), 5),
                interval(t0() + mins(2), t0() + mins(3), 0),
                interval(t1(), t1() + mins(1), 4),
                interval(t1() + mins(1), t1() + mins(2), 6),
            ]
        );
        assert_eq!(out.intervals[..3].iter().map(|i| i.count).sum::<i64>(), 8);
        assert_eq!(out.intervals[3..].iter().map(|i| i.count).sum::<i64>(), 10);
    }

    #[test]
    fn test_reversed_input_with_opposite_order() {
        let oldest_first = vec![
            sample(t0(), t0() + mins(5), 20),
            sample(t0(), t0() + mins(10), 50),
        ];
        let mut newest_first = oldest_first.clone();
        newest_first.reverse();

        let a = extract(RawSeries::new(METRIC, oldest_first), SampleOrder::OldestFirst);
        let b = extract(RawSeries::new(METRIC, newest_first), SampleOrder::NewestFirst);
        assert_eq!(a, b);
    }

    #[test]
    fn test_subject_is_carried_over() {
        let samples = vec![
            sample(t0(), t0() + mins(5), 1)
                .with_label(SUBJECT_ID_LABEL, "user-1")
                .with_label(SUBJECT_TYPE_LABEL, "user"),
        ];

        let series = RawSeries::new(METRIC, samples);
        let by_ref = extract_ref(&series, SampleOrder::NewestFirst);
        let by_value = extract(series, SampleOrder::NewestFirst);

        assert_eq!(by_value.subject_id, "user-1");
        assert_eq!(by_value.subject_type, "user");
        assert_eq!(by_ref, by_value);
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let oldest_first = vec![
            sample(t0(), t0() + mins(5), i64::MIN),
            sample(t0(), t0() + mins(10), i64::MAX),
        ];

        let out = intervals(&oldest_first, SampleOrder::OldestFirst);
        assert_eq!(out[1].count, i64::MAX);
    }
}
