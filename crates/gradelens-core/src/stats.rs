//! Dashboard statistics over a fetched list of evaluation records.
//!
//! The store returns records in no guaranteed order. Recency is taken from
//! `id` alone: a higher id is a later evaluation.

use crate::record::EvaluationRecord;

/// Number of rows shown in the recent evaluations table.
pub const RECENT_LEN: usize = 6;
/// Number of points in the score trend.
pub const TREND_LEN: usize = 10;

/// One point of the score trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub label: String,
    pub score: f64,
}

/// Summary statistics borrowed from a record slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics<'a> {
    pub total: usize,
    /// Mean score, missing scores counted as 0.
    pub average: f64,
    pub best: f64,
    /// Score of the record with the highest id.
    pub most_recent: f64,
    /// Up to [`RECENT_LEN`] records, newest first.
    pub recent: Vec<&'a EvaluationRecord>,
    /// Up to [`TREND_LEN`] points, oldest first.
    pub trend: Vec<TrendPoint>,
}

impl Statistics<'_> {
    /// Average clamped to [0, 100] for progress bars.
    pub fn average_progress(&self) -> f64 {
        self.average.clamp(0.0, 100.0)
    }
}

/// Aggregate a list of records. Never fails and never reorders the input.
///
/// Records are stably sorted newest-first by id (missing id as 0), so equal
/// ids keep their input order.
pub fn aggregate(records: &[EvaluationRecord]) -> Statistics<'_> {
    if records.is_empty() {
        return Statistics {
            total: 0,
            average: 0.0,
            best: 0.0,
            most_recent: 0.0,
            recent: Vec::new(),
            trend: Vec::new(),
        };
    }

    let mut sorted: Vec<&EvaluationRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.id_or_zero().cmp(&a.id_or_zero()));

    let total = records.len();
    let sum: f64 = records.iter().map(EvaluationRecord::score_or_zero).sum();
    let best = records
        .iter()
        .map(EvaluationRecord::score_or_zero)
        .fold(f64::NEG_INFINITY, f64::max);
    let most_recent = sorted[0].score_or_zero();

    let recent = sorted.iter().take(RECENT_LEN).copied().collect();

    let trend = sorted
        .iter()
        .take(TREND_LEN)
        .rev()
        .enumerate()
        .map(|(idx, rec)| TrendPoint {
            label: trend_label(rec.id, idx),
            score: rec.score_or_zero(),
        })
        .collect();

    Statistics {
        total,
        average: sum / total as f64,
        best,
        most_recent,
        recent,
        trend,
    }
}

/// `#<id>`, or `#<position + 1>` when the id is missing or zero.
///
/// The positional fallback can collide with a real small id; it is kept
/// as-is because charts of existing data already show these labels.
fn trend_label(id: Option<i64>, idx: usize) -> String {
    match id {
        Some(id) if id != 0 => format!("#{id}"),
        _ => format!("#{}", idx + 1),
    }
}
