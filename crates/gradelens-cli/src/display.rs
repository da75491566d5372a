//! Terminal views for the dashboard, evaluation history, and result details.
//!
//! Each view is a small struct implementing `Display`, so commands print it
//! with `print!` and tests render it with `to_string()`.

use std::fmt;

use chrono::{DateTime, Utc};
use gradelens_core::{
    EvaluationOutput, EvaluationRecord, Explanation, ModelAnswer, Statistics, UNAVAILABLE_MESSAGE,
    classify, format_score, normalize,
};

const BAR_WIDTH: usize = 40;
const TEXT_PREVIEW: usize = 40;
const LABEL_WIDTH: usize = 20;

// ── Dashboard ──

/// Stat cards, score trend, and the recent evaluations table.
pub struct DashboardView<'a> {
    pub stats: &'a Statistics<'a>,
    pub refreshed_at: DateTime<Utc>,
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        writeln!(f, "=== Evaluation Dashboard ===")?;
        writeln!(
            f,
            "refreshed {}",
            self.refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f)?;

        writeln!(f, "  {:<LABEL_WIDTH$} {}", "Total Evaluations", stats.total)?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}%  {}",
            "Average Score",
            format_score(Some(stats.average)),
            progress_bar(stats.average_progress())
        )?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}%",
            "Best Score",
            format_score(Some(stats.best))
        )?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}%",
            "Last Score",
            format_score(Some(stats.most_recent))
        )?;
        writeln!(f)?;

        writeln!(f, "Score Trend (last 10 evaluations)")?;
        if stats.trend.is_empty() {
            writeln!(f, "  No evaluations yet. Upload and evaluate to see trends.")?;
        } else {
            for point in &stats.trend {
                writeln!(
                    f,
                    "  {:>6} {:<BAR_WIDTH$} {}",
                    point.label,
                    bar(point.score),
                    format_score(Some(point.score))
                )?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Recent Evaluations (latest 6)")?;
        writeln!(f, "  {:<8} {:<18} {:<12} {}", "ID", "Score", "Language", "OCR")?;
        if stats.recent.is_empty() {
            writeln!(f, "  No data yet.")?;
        }
        for rec in &stats.recent {
            writeln!(
                f,
                "  {:<8} {:<18} {:<12} {}",
                id_cell(rec),
                banded_score(rec.score_or_zero()),
                rec.language_label(),
                rec.ocr_label()
            )?;
        }
        Ok(())
    }
}

// ── Evaluation history ──

/// All evaluation records, in the order the store returned them.
pub struct HistoryView<'a> {
    pub records: &'a [EvaluationRecord],
}

impl fmt::Display for HistoryView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Evaluation History ===")?;
        if self.records.is_empty() {
            return writeln!(f, "No results yet.");
        }
        writeln!(
            f,
            "{:<8} {:<8} {:<12} {:<10} {:<32} {}",
            "ID", "Score", "OCR Engine", "Language", "Feedback", "Extracted Text"
        )?;
        for rec in self.records {
            writeln!(
                f,
                "{:<8} {:<8} {:<12} {:<10} {:<32} {}",
                id_cell(rec),
                format_score(rec.score),
                rec.ocr_label(),
                rec.language_label(),
                truncate(rec.feedback.as_deref().unwrap_or(""), 30),
                truncate(&single_line(&rec.extracted_text), TEXT_PREVIEW)
            )?;
        }
        Ok(())
    }
}

// ── Result detail ──

/// Full card for one persisted record, including its explainability block.
pub struct ResultDetailView<'a> {
    pub record: &'a EvaluationRecord,
}

impl fmt::Display for ResultDetailView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rec = self.record;
        writeln!(f, "=== Result Details (ID: {}) ===", id_cell(rec))?;
        writeln!(f, "  {:<LABEL_WIDTH$} {}", "Score", banded_score(rec.score_or_zero()))?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}",
            "Feedback",
            rec.feedback.as_deref().unwrap_or("--")
        )?;
        writeln!(f, "  {:<LABEL_WIDTH$} {}", "Language", rec.language_label())?;
        writeln!(f, "  {:<LABEL_WIDTH$} {}", "OCR Engine", rec.ocr_label())?;
        if let Some(ts) = &rec.created_at {
            writeln!(f, "  {:<LABEL_WIDTH$} {}", "Evaluated At", ts)?;
        }
        if !rec.missing_keywords.is_empty() {
            writeln!(
                f,
                "  {:<LABEL_WIDTH$} {}",
                "Missing Keywords",
                rec.missing_keywords.join(", ")
            )?;
        }
        writeln!(f)?;

        write_explanation(f, &normalize(rec))?;
        writeln!(f)?;

        writeln!(f, "Extracted Text")?;
        write_block(f, &rec.extracted_text)
    }
}

/// Output of a fresh upload-and-evaluate run.
pub struct EvaluationView<'a> {
    pub output: &'a EvaluationOutput,
}

impl fmt::Display for EvaluationView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let out = self.output;
        writeln!(f, "=== Evaluation Result ===")?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}",
            "Score",
            banded_score(out.score.unwrap_or(0.0))
        )?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}",
            "Feedback",
            out.feedback.as_deref().unwrap_or("--")
        )?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}",
            "Language",
            out.language.as_deref().unwrap_or("unknown")
        )?;
        writeln!(
            f,
            "  {:<LABEL_WIDTH$} {}",
            "OCR Engine",
            out.ocr_engine.as_deref().unwrap_or("--")
        )?;
        let keywords = if out.missing_keywords.is_empty() {
            "None".to_string()
        } else {
            out.missing_keywords.join(", ")
        };
        writeln!(f, "  {:<LABEL_WIDTH$} {}", "Missing Keywords", keywords)?;
        writeln!(f)?;

        write_explanation(f, &normalize(out))?;
        writeln!(f)?;

        writeln!(f, "Extracted Text")?;
        write_block(f, &out.text)
    }
}

/// Explainability block. Matched and missing points are only listed when
/// there are any.
fn write_explanation(f: &mut fmt::Formatter<'_>, explanation: &Explanation) -> fmt::Result {
    writeln!(f, "Explainable AI")?;
    let exp = match explanation {
        Explanation::Available(exp) => exp,
        Explanation::Unavailable => return writeln!(f, "  {UNAVAILABLE_MESSAGE}"),
    };

    writeln!(f, "  {:<LABEL_WIDTH$} {}", "Similarity", exp.similarity)?;
    writeln!(f, "  {:<LABEL_WIDTH$} {}", "Length Ratio", exp.length_ratio)?;
    if !exp.explanation.is_empty() {
        writeln!(f, "  Explanation:")?;
        write_block(f, &exp.explanation)?;
    }

    if !exp.matched.is_empty() {
        writeln!(f, "  Matched Points:")?;
        for m in &exp.matched {
            writeln!(f, "    - {} → {}", m.similarity, m.model_sentence)?;
        }
    }

    if !exp.missing.is_empty() {
        writeln!(f, "  Missing Points:")?;
        for point in &exp.missing {
            writeln!(f, "    - {point}")?;
        }
    }
    Ok(())
}

// ── Model answers ──

pub struct ModelAnswersView<'a> {
    pub answers: &'a [ModelAnswer],
}

impl fmt::Display for ModelAnswersView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Model Answers ===")?;
        if self.answers.is_empty() {
            return writeln!(f, "No model answers yet.");
        }
        for ans in self.answers {
            writeln!(f, "  {:<6} {}", ans.id, ans.question_title)?;
            writeln!(
                f,
                "         {}",
                truncate(&single_line(&ans.model_text), 70)
            )?;
        }
        Ok(())
    }
}

// ── Helpers ──

fn id_cell(rec: &EvaluationRecord) -> String {
    rec.id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn banded_score(score: f64) -> String {
    format!("{}% [{}]", format_score(Some(score)), classify(score))
}

/// Horizontal bar for a 0-100 score.
fn bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 100.0) / 100.0 * BAR_WIDTH as f64).round() as usize;
    "█".repeat(filled)
}

fn progress_bar(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = (percent / 100.0 * 20.0).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}

/// Indented block of free text, wrapped only at existing line breaks.
fn write_block(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if text.trim().is_empty() {
        return writeln!(f, "    --");
    }
    for line in text.lines() {
        writeln!(f, "    {line}")?;
    }
    Ok(())
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
