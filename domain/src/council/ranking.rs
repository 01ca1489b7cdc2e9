//! Ranking extraction and aggregation for peer evaluation.
//!
//! Pure functions over evaluation text. No I/O, no model identities:
//! everything here works on [`AnonymizedLabel`]s and only resolves them
//! to models through the run's [`LabelMap`].
//!
//! | Function | Input | Output |
//! |----------|-------|--------|
//! | [`parse_ranking`] | one evaluator's raw text | ordered labels, best first |
//! | [`aggregate_rankings`] | every parsed ranking + label map | rows sorted by average rank |

use super::label::{AnonymizedLabel, LabelMap};
use crate::core::model_id::ModelId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Section marker evaluators are instructed to emit (matched case-insensitively).
pub const FINAL_RANKING_MARKER: &str = "FINAL RANKING:";

static NUMBERED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.\s*(Response [A-Z]+)\b").expect("NUMBERED_LINE regex should compile")
});

static LABEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bResponse [A-Z]+\b").expect("LABEL_TOKEN regex should compile")
});

/// Extract an evaluator's ranking from free text.
///
/// 1. Locate the first `FINAL RANKING:` marker (any case) and read the
///    numbered lines `<n>. <label>` that follow it, stopping at the first
///    line that does not match. Blank lines before the first entry are skipped.
/// 2. If there is no marker, or it yields no labels, scan the whole text
///    for label tokens in first-occurrence order.
///
/// Numbered entries keep their line position, so a repeated label is
/// listed again rather than shifting later entries up. The fallback scan
/// lists each label once. The result may be empty.
pub fn parse_ranking(text: &str) -> Vec<AnonymizedLabel> {
    if let Some(section) = ranking_section(text) {
        let ranked = parse_numbered_list(section);
        if !ranked.is_empty() {
            return ranked;
        }
    }
    scan_labels(text)
}

/// Text following the marker, if present.
fn ranking_section(text: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lowered = text.to_ascii_lowercase();
    let marker = FINAL_RANKING_MARKER.to_ascii_lowercase();
    let start = lowered.find(&marker)? + marker.len();
    Some(&text[start..])
}

fn parse_numbered_list(section: &str) -> Vec<AnonymizedLabel> {
    let mut ranked: Vec<AnonymizedLabel> = Vec::new();
    let mut lines = section.lines().peekable();

    // The marker line's remainder and any blank lines before the list
    while let Some(line) = lines.peek() {
        if line.trim().is_empty() {
            lines.next();
        } else {
            break;
        }
    }

    for line in lines {
        let Some(caps) = NUMBERED_LINE.captures(line) else {
            break;
        };
        if let Some(label) = AnonymizedLabel::parse(&caps[1]) {
            ranked.push(label);
        }
    }
    ranked
}

fn scan_labels(text: &str) -> Vec<AnonymizedLabel> {
    let mut found: Vec<AnonymizedLabel> = Vec::new();
    for m in LABEL_TOKEN.find_iter(text) {
        if let Some(label) = AnonymizedLabel::parse(m.as_str())
            && !found.contains(&label)
        {
            found.push(label);
        }
    }
    found
}

/// One model's position in the aggregate ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRankingRow {
    pub model: ModelId,
    /// Mean 1-indexed position, rounded to two decimals.
    pub average_rank: f64,
    pub evaluation_count: usize,
}

/// Combine parsed rankings into one ordering.
///
/// Each model's average rank is the mean of its 1-indexed positions over
/// the rankings that include its label; only the first occurrence of a
/// label in one ranking counts. Models never ranked are absent.
/// Labels not in `labels` are ignored. Rows are sorted ascending by
/// average, then by higher evaluation count, then by label order.
pub fn aggregate_rankings<'a, I>(rankings: I, labels: &LabelMap) -> Vec<AggregateRankingRow>
where
    I: IntoIterator<Item = &'a [AnonymizedLabel]>,
{
    let mut positions: HashMap<usize, Vec<usize>> = HashMap::new();

    for ranking in rankings {
        let mut counted = HashSet::new();
        for (idx, label) in ranking.iter().enumerate() {
            if let Some(slot) = labels.position(label)
                && counted.insert(slot)
            {
                positions.entry(slot).or_default().push(idx + 1);
            }
        }
    }

    let mut rows: Vec<(usize, f64, usize)> = positions
        .into_iter()
        .map(|(slot, ranks)| {
            let mean = ranks.iter().sum::<usize>() as f64 / ranks.len() as f64;
            (slot, mean, ranks.len())
        })
        .collect();

    rows.sort_by(|a, b| {
        a.1.total_cmp(&b.1)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.0.cmp(&b.0))
    });

    let models: Vec<&ModelId> = labels.iter().map(|(_, model)| model).collect();
    rows.into_iter()
        .map(|(slot, mean, count)| AggregateRankingRow {
            model: models[slot].clone(),
            average_rank: round2(mean),
            evaluation_count: count,
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
