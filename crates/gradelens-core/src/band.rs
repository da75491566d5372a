//! Score banding and display formatting.

use std::fmt;

/// Visual band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band a score. Lower bounds are inclusive: 85 is high, 65 is medium.
///
/// Out-of-range scores are banded by the same thresholds; NaN is low.
pub fn classify(score: f64) -> ScoreBand {
    if score >= 85.0 {
        ScoreBand::High
    } else if score >= 65.0 {
        ScoreBand::Medium
    } else {
        ScoreBand::Low
    }
}

/// Two-decimal score, or `--` when absent or not finite.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.is_finite() => format!("{s:.2}"),
        _ => "--".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries() {
        assert_eq!(classify(85.0), ScoreBand::High);
        assert_eq!(classify(84.99), ScoreBand::Medium);
        assert_eq!(classify(65.0), ScoreBand::Medium);
        assert_eq!(classify(64.99), ScoreBand::Low);
    }

    #[test]
    fn out_of_range_scores_still_band() {
        assert_eq!(classify(150.0), ScoreBand::High);
        assert_eq!(classify(-3.0), ScoreBand::Low);
        assert_eq!(classify(f64::NAN), ScoreBand::Low);
        assert_eq!(classify(f64::INFINITY), ScoreBand::High);
    }

    #[test]
    fn band_display() {
        assert_eq!(ScoreBand::High.to_string(), "high");
        assert_eq!(ScoreBand::Low.as_str(), "low");
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(Some(80.0)), "80.00");
        assert_eq!(format_score(Some(56.666_666)), "56.67");
        assert_eq!(format_score(None), "--");
        assert_eq!(format_score(Some(f64::NAN)), "--");
    }
}
