//! Per-montage channel matching.
//!
//! # Position method
//!
//! ```text
//! recording (R channels) × montage (M channels)
//!   │
//!   ├─ distance_matrix()     D[r, m] = ‖pos_r − pos_m‖   (NaN if unknown)
//!   ├─ find_mutual_min()     per row: argmin over row, then argmin over
//!   │                        that column; accepted only if it points back
//!   │                        to the same row and neither minimum is tied
//!   ├─ score                 mean accepted distance × 100, rounded to 5 dp
//!   │                        (INVALID_POS_SCORE if any row hit a tie)
//!   └─ match_count           assigned channels minus repeated assignments
//! ```
//!
//! Ties are never broken arbitrarily: a tied row stays unassigned and the
//! montage is flagged invalid for automatic ranking.
//!
//! # Channel-name method
//!
//! A recording channel pairs with the montage channel of the identical name.
//! The result is always valid and carries no score.
use ndarray::Array2;
use serde::Serialize;
use std::collections::HashSet;

use crate::channels::ChannelSet;
use crate::config::{MatchConfig, PositionMethod, INVALID_POS_SCORE};
use crate::logging::MatchLog;
use crate::position::{position_distance, Position};

// ── Result records ────────────────────────────────────────────────────────

/// Outcome for a single recording channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelMatch {
    /// Recording channel name.
    pub channel: String,
    /// Montage channel it was paired with.
    pub assigned: Option<String>,
    /// Montage position used for the pairing.
    pub matched_position: Option<Position>,
    /// Distance to the paired montage channel, NaN when unpaired.
    pub distance: f64,
}

impl ChannelMatch {
    fn unmatched(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            assigned: None,
            matched_position: None,
            distance: f64::NAN,
        }
    }
}

/// A montage channel assigned to more than one recording channel.
///
/// `index` is the 0-based recording-channel position of the repeat; the
/// first occurrence is never reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    pub index: usize,
    pub name: String,
}

/// Everything one matching run learned about one montage.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub montage: String,
    pub method: PositionMethod,
    /// One entry per recording channel, in recording order.
    pub channels: Vec<ChannelMatch>,
    /// `false` once any row hit an unresolvable tie.
    pub valid: bool,
    /// Ranking score; `None` for the channel-name method.
    pub score: Option<f64>,
    pub duplicates: Vec<Duplicate>,
    pub match_count: usize,
    /// `"match_count/total"`.
    pub match_ratio: String,
}

impl MatchResult {
    fn assemble(
        montage: &str,
        method: PositionMethod,
        channels: Vec<ChannelMatch>,
        valid: bool,
        score: Option<f64>,
    ) -> Self {
        let values: Vec<Option<&str>> = channels.iter().map(|c| c.assigned.as_deref()).collect();
        let duplicates = find_duplicates(&values);
        let (match_count, match_ratio) = matched_ratio(&values, &duplicates);
        Self {
            montage: montage.to_string(),
            method,
            channels,
            valid,
            score,
            duplicates,
            match_count,
            match_ratio,
        }
    }

    /// `true` when the score is the INVALID sentinel.
    pub fn is_invalid(&self) -> bool {
        self.score == Some(INVALID_POS_SCORE)
    }

    pub fn get(&self, channel: &str) -> Option<&ChannelMatch> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    /// Rename map for the recording: accepted pairings whose montage channel
    /// is not a repeat of an earlier one.
    pub fn channel_mapping(&self) -> Vec<(String, String)> {
        let dup_idx: HashSet<usize> = self.duplicates.iter().map(|d| d.index).collect();
        self.channels
            .iter()
            .enumerate()
            .filter(|(i, _)| !dup_idx.contains(i))
            .filter_map(|(_, c)| c.assigned.as_ref().map(|a| (c.channel.clone(), a.clone())))
            .collect()
    }
}

// ── Duplicate resolution ──────────────────────────────────────────────────

/// Flag every repeat occurrence of an assigned value, scanning in order.
///
/// Unassigned entries (`None`) are skipped.
pub fn find_duplicates(values: &[Option<&str>]) -> Vec<Duplicate> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for (index, v) in values.iter().enumerate() {
        let Some(name) = v else { continue };
        if !seen.insert(*name) {
            dups.push(Duplicate { index, name: name.to_string() });
        }
    }
    dups
}

/// `(match_count, "match_count/total")`.
pub fn matched_ratio(values: &[Option<&str>], duplicates: &[Duplicate]) -> (usize, String) {
    let assigned = values.iter().filter(|v| v.is_some()).count();
    let count = assigned - duplicates.len();
    (count, format!("{count}/{}", values.len()))
}

// ── Mutual nearest neighbour ──────────────────────────────────────────────

/// `D[r, m]` = distance between recording channel `r` and montage channel `m`.
pub fn distance_matrix(recording: &ChannelSet, montage: &ChannelSet) -> Array2<f64> {
    let rec: Vec<&Position> = recording.iter().map(|c| &c.pos).collect();
    let mon: Vec<&Position> = montage.iter().map(|c| &c.pos).collect();
    Array2::from_shape_fn((rec.len(), mon.len()), |(r, m)| position_distance(mon[m], rec[r]))
}

/// Which side of a mutual-minimum search tied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tie {
    /// Several montage channels are equally close to the recording channel.
    MontageChannels,
    /// Several recording channels are equally close to the montage channel.
    RecordingChannels,
}

/// Outcome of [`find_mutual_min`] for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMatch {
    /// Mutual nearest neighbour: the montage column.
    Matched(usize),
    /// Unresolvable tie; invalidates the montage.
    Ambiguous(Tie),
    /// The column's closest recording channel is a different row.
    NotMutual,
    /// Every distance in the row is NaN.
    NoCandidate,
}

/// Index of the minimum over non-NaN values and how many values equal it.
fn min_with_count<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(usize, usize)> {
    let mut best: Option<(usize, f64)> = None;
    let mut count = 0;
    for (i, &v) in values.enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v > b => {}
            Some((_, b)) if v == b => count += 1,
            _ => {
                best = Some((i, v));
                count = 1;
            }
        }
    }
    best.map(|(i, _)| (i, count))
}

/// Two-sided minimum check for row `row` of a distance matrix.
pub fn find_mutual_min(matrix: &Array2<f64>, row: usize) -> RowMatch {
    let Some((col, n_cols)) = min_with_count(matrix.row(row).iter()) else {
        return RowMatch::NoCandidate;
    };
    if n_cols > 1 {
        return RowMatch::Ambiguous(Tie::MontageChannels);
    }
    // The column holds at least this row's finite value.
    let Some((min_row, n_rows)) = min_with_count(matrix.column(col).iter()) else {
        return RowMatch::NoCandidate;
    };
    if n_rows > 1 {
        return RowMatch::Ambiguous(Tie::RecordingChannels);
    }
    if min_row == row {
        RowMatch::Matched(col)
    } else {
        RowMatch::NotMutual
    }
}

// ── Methods ───────────────────────────────────────────────────────────────

/// Match `recording` against one montage with the configured method.
pub fn match_montage(
    recording: &ChannelSet,
    montage_name: &str,
    montage: &ChannelSet,
    cfg: &MatchConfig,
    log: &dyn MatchLog,
) -> MatchResult {
    match cfg.method {
        PositionMethod::Position => match_by_position(recording, montage_name, montage, cfg, log),
        PositionMethod::ChannelName => match_by_name(recording, montage_name, montage, log),
    }
}

/// Mutual-nearest-neighbour matching on electrode positions.
pub fn match_by_position(
    recording: &ChannelSet,
    montage_name: &str,
    montage: &ChannelSet,
    cfg: &MatchConfig,
    log: &dyn MatchLog,
) -> MatchResult {
    log_unmatchable(recording, montage_name, log);

    let matrix = distance_matrix(recording, montage);
    let mut valid = true;
    let mut channels = Vec::with_capacity(recording.len());

    for (row, ch) in recording.iter().enumerate() {
        match find_mutual_min(&matrix, row) {
            RowMatch::Matched(col) => {
                let target = montage.iter().nth(col).map(|m| (m.name.clone(), m.pos));
                match target {
                    Some((name, pos)) => channels.push(ChannelMatch {
                        channel: ch.name.clone(),
                        assigned: Some(name),
                        matched_position: Some(pos),
                        distance: matrix[[row, col]],
                    }),
                    None => channels.push(ChannelMatch::unmatched(&ch.name)),
                }
            }
            RowMatch::Ambiguous(tie) => {
                valid = false;
                let msg = match tie {
                    Tie::MontageChannels => "several montage channels share the closest position",
                    Tie::RecordingChannels => "several data channels share the closest position",
                };
                log.info(&format!("{montage_name}: {}: {msg}", ch.name));
                channels.push(ChannelMatch::unmatched(&ch.name));
            }
            RowMatch::NotMutual | RowMatch::NoCandidate => {
                channels.push(ChannelMatch::unmatched(&ch.name));
            }
        }
    }

    let accepted: Vec<f64> = channels
        .iter()
        .filter(|c| c.assigned.is_some())
        .map(|c| c.distance)
        .collect();
    let score = if valid && !accepted.is_empty() {
        let mean = accepted.iter().sum::<f64>() / accepted.len() as f64;
        cfg.scale_score(mean)
    } else {
        INVALID_POS_SCORE
    };

    let result = MatchResult::assemble(montage_name, PositionMethod::Position, channels, valid, Some(score));
    log.debug(&format!("{montage_name}: score {score}, matched {}", result.match_ratio));
    result
}

fn log_unmatchable(recording: &ChannelSet, montage_name: &str, log: &dyn MatchLog) {
    for ch in recording.unmatchable() {
        log.info(&format!(
            "{montage_name}: channel {} has a NaN coordinate {:?}, skipped",
            ch.name, ch.pos
        ));
    }
}

/// Identity matching on channel names. A channel with a NaN coordinate is
/// left unassigned even when the montage has its name.
pub fn match_by_name(
    recording: &ChannelSet,
    montage_name: &str,
    montage: &ChannelSet,
    log: &dyn MatchLog,
) -> MatchResult {
    log_unmatchable(recording, montage_name, log);

    let channels: Vec<ChannelMatch> = recording
        .iter()
        .map(|ch| match montage.get(&ch.name) {
            Some(mpos) if ch.is_matchable() => ChannelMatch {
                channel: ch.name.clone(),
                assigned: Some(ch.name.clone()),
                matched_position: Some(*mpos),
                distance: position_distance(mpos, &ch.pos),
            },
            _ => ChannelMatch::unmatched(&ch.name),
        })
        .collect();

    let result = MatchResult::assemble(montage_name, PositionMethod::ChannelName, channels, true, None);
    log.debug(&format!("{montage_name}: matched {} by name", result.match_ratio));
    result
}
