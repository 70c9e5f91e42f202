//! Montage ranking and operator selection.
//!
//! [`rank_montages`] orders montages by ascending score (stable, so ties keep
//! catalog order). [`evaluate_selection`] validates a 1-based pick against a
//! ranking and returns either the montage name or why the pick was refused;
//! prompting and re-prompting belong to the caller.
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::config::INVALID_POS_SCORE;
use crate::error::{MontageError, Result};
use crate::matching::MatchResult;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedMontage {
    pub name: String,
    pub score: Option<f64>,
    pub match_ratio: String,
}

impl RankedMontage {
    /// `true` when the montage can be chosen.
    pub fn is_usable(&self) -> bool {
        matches!(self.score, Some(s) if s != INVALID_POS_SCORE)
    }
}

impl fmt::Display for RankedMontage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.score {
            Some(s) => write!(f, "{}: {s}, {}", self.name, self.match_ratio),
            None => write!(f, "{}: -, {}", self.name, self.match_ratio),
        }
    }
}

/// Montages ordered best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    entries: Vec<RankedMontage>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RankedMontage] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// First usable montage.
    pub fn best(&self) -> Option<&RankedMontage> {
        self.entries.iter().find(|e| e.is_usable())
    }

    /// The `n` best candidates, as offered to the operator.
    pub fn top(&self, n: usize) -> Ranking {
        Ranking { entries: self.entries.iter().take(n).cloned().collect() }
    }

    /// `"(i) name: score, ratio"` lines, 1-based.
    pub fn scoreboard(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("({}) {e}", i + 1))
            .collect()
    }
}

fn score_key(score: Option<f64>) -> f64 {
    match score {
        Some(s) if !s.is_nan() => s,
        _ => f64::INFINITY,
    }
}

/// Order montages by ascending score.
///
/// Unscored results (channel-name method) go after every scored one. Fails
/// with [`MontageError::NoUsableMontage`] when no result has a score other
/// than [`INVALID_POS_SCORE`].
pub fn rank_montages(results: &[MatchResult]) -> Result<Ranking> {
    let mut entries: Vec<RankedMontage> = results
        .iter()
        .map(|r| RankedMontage {
            name: r.montage.clone(),
            score: r.score,
            match_ratio: r.match_ratio.clone(),
        })
        .collect();

    if !entries.iter().any(RankedMontage::is_usable) {
        return Err(MontageError::NoUsableMontage);
    }

    entries.sort_by(|a, b| {
        score_key(a.score)
            .partial_cmp(&score_key(b.score))
            .unwrap_or(Ordering::Equal)
    });
    Ok(Ranking { entries })
}

/// Why an operator pick was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionRejection {
    #[error("selection cancelled")]
    Cancelled,

    #[error("please type in a number, not a string: {0}")]
    NotNumeric(String),

    #[error("please select a number 1 or above")]
    BelowRange,

    #[error("please select a montage between 1 and {max}")]
    AboveRange { index: usize, max: usize },

    #[error("montage {0} is not valid for this recording, please select another")]
    InvalidMontage(String),
}

/// Keyword that cancels an interactive selection.
pub const CANCEL_KEYWORD: &str = "e";

/// Parse one line of operator input into a 1-based index.
pub fn parse_selection(input: &str) -> std::result::Result<usize, SelectionRejection> {
    let input = input.trim();
    if input == CANCEL_KEYWORD {
        return Err(SelectionRejection::Cancelled);
    }
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return Err(SelectionRejection::NotNumeric(input.to_string()));
    }
    // All digits but too long for usize: certainly out of range.
    Ok(input.parse().unwrap_or(usize::MAX))
}

/// Validate a 1-based pick against `ranking`.
pub fn evaluate_selection(
    index: usize,
    ranking: &Ranking,
) -> std::result::Result<String, SelectionRejection> {
    if index == 0 {
        return Err(SelectionRejection::BelowRange);
    }
    let Some(entry) = ranking.entries.get(index - 1) else {
        return Err(SelectionRejection::AboveRange { index, max: ranking.len() });
    };
    if !entry.is_usable() {
        return Err(SelectionRejection::InvalidMontage(entry.name.clone()));
    }
    Ok(entry.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranking(items: &[(&str, Option<f64>)]) -> Ranking {
        Ranking {
            entries: items
                .iter()
                .map(|(n, s)| RankedMontage {
                    name: n.to_string(),
                    score: *s,
                    match_ratio: "1/1".into(),
                })
                .collect(),
        }
    }

    #[test]
    fn parse_accepts_digits() {
        assert_eq!(parse_selection("3\n"), Ok(3));
        assert_eq!(parse_selection(" 12 "), Ok(12));
    }

    #[test]
    fn parse_rejects_text_and_cancels() {
        assert_eq!(parse_selection("e"), Err(SelectionRejection::Cancelled));
        assert_eq!(parse_selection("two"), Err(SelectionRejection::NotNumeric("two".into())));
        assert_eq!(parse_selection("-1"), Err(SelectionRejection::NotNumeric("-1".into())));
        assert_eq!(parse_selection(""), Err(SelectionRejection::NotNumeric(String::new())));
    }

    #[test]
    fn huge_number_is_out_of_range() {
        let r = ranking(&[("a", Some(1.0))]);
        let idx = parse_selection("99999999999999999999999").unwrap();
        assert!(matches!(evaluate_selection(idx, &r), Err(SelectionRejection::AboveRange { .. })));
    }

    #[test]
    fn selection_bounds() {
        let r = ranking(&[("a", Some(1.0)), ("b", Some(2.0))]);
        assert_eq!(evaluate_selection(0, &r), Err(SelectionRejection::BelowRange));
        assert_eq!(evaluate_selection(3, &r), Err(SelectionRejection::AboveRange { index: 3, max: 2 }));
        assert_eq!(evaluate_selection(2, &r), Ok("b".to_string()));
    }

    #[test]
    fn selection_refuses_invalid_montage() {
        let r = ranking(&[("a", Some(1.0)), ("b", Some(INVALID_POS_SCORE))]);
        assert_eq!(evaluate_selection(2, &r), Err(SelectionRejection::InvalidMontage("b".into())));
    }

    #[test]
    fn scoreboard_lines_are_one_based() {
        let r = ranking(&[("a", Some(1.5)), ("b", None)]);
        assert_eq!(r.scoreboard(), vec!["(1) a: 1.5, 1/1", "(2) b: -, 1/1"]);
    }

    #[test]
    fn top_truncates() {
        let r = ranking(&[("a", Some(1.0)), ("b", Some(2.0)), ("c", Some(3.0))]);
        assert_eq!(r.top(2).names(), vec!["a", "b"]);
        assert_eq!(r.top(10).len(), 3);
    }
}
