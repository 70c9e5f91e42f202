//! Recording channel metadata and EEG channel extraction.
//!
//! A reduced view of MNE's `Info`: channel records (`chs`) and digitised
//! points (`dig`). Kind codes mirror `mne/_fiff/constants.py` so values read
//! from an MNE export can be compared directly.
//!
//! Some acquisition systems label reference or ocular electrodes (`A1`,
//! `EOG`, …) as EEG. [`adjust_chan_kind`] reclassifies them, in `chs` and in
//! the matching `dig` point, before [`get_chanlocs`] keeps the EEG channels.
use serde::{Deserialize, Serialize};

use crate::channels::{ChannelPosition, ChannelSet};
use crate::error::Result;
use crate::logging::MatchLog;
use crate::position::{has_nan, positions_within, Position};

// ── Channel kind codes (`ChannelInfo::kind`) ──────────────────────────────

/// EEG scalp-potential channel.
pub const FIFFV_EEG_CH: i32 = 2;
/// Stimulus / trigger channel.
pub const FIFFV_STIM_CH: i32 = 3;
/// Electro-oculogram channel.
pub const FIFFV_EOG_CH: i32 = 202;
/// Electrocardiogram channel.
pub const FIFFV_ECG_CH: i32 = 402;
/// Miscellaneous auxiliary channel.
pub const FIFFV_MISC_CH: i32 = 502;

// ── Digitisation point kinds (`DigPoint::kind`) ───────────────────────────

/// Fiducial (nasion, LPA, RPA).
pub const FIFFV_POINT_CARDINAL: i32 = 1;
/// Head-position-indicator coil.
pub const FIFFV_POINT_HPI: i32 = 2;
/// EEG electrode.
pub const FIFFV_POINT_EEG: i32 = 3;
/// Extra head-shape point.
pub const FIFFV_POINT_EXTRA: i32 = 4;

/// Channel names that are never scalp EEG, with the kind they belong to.
pub const NON_STANDARD_CHANNEL_KINDS: &[(&str, i32)] = &[
    ("A1", FIFFV_MISC_CH),
    ("A2", FIFFV_MISC_CH),
    ("EOG", FIFFV_EOG_CH),
    ("VEOG", FIFFV_EOG_CH),
    ("HEOG", FIFFV_EOG_CH),
    ("EOGV", FIFFV_EOG_CH),
    ("EOGH", FIFFV_EOG_CH),
];

/// Kind a non-standard channel name should carry, if any.
pub fn non_standard_kind(name: &str) -> Option<i32> {
    NON_STANDARD_CHANNEL_KINDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, k)| k)
}

// ── Records ───────────────────────────────────────────────────────────────

/// One channel record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub name: String,
    pub kind: i32,
    /// Electrode position `loc[0..3]` in metres.
    pub loc: Position,
}

/// One digitised point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigPoint {
    pub kind: i32,
    pub ident: i32,
    pub r: Position,
}

/// Channel records and digitisation for one recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasInfo {
    pub chs: Vec<ChannelInfo>,
    pub dig: Vec<DigPoint>,
}

impl MeasInfo {
    /// Channel names in order.
    pub fn ch_names(&self) -> Vec<&str> {
        self.chs.iter().map(|c| c.name.as_str()).collect()
    }
}

// ── Reclassification ──────────────────────────────────────────────────────

/// Reclassify channels listed in [`NON_STANDARD_CHANNEL_KINDS`].
/// Returns how many channels changed kind.
pub fn adjust_nonstd_chans(info: &mut MeasInfo, log: &dyn MatchLog) -> usize {
    let mut changed = 0;
    for ch in info.chs.iter_mut() {
        if let Some(kind) = non_standard_kind(&ch.name) {
            if ch.kind != kind {
                log.debug(&format!("channel {}: kind {} -> {kind}", ch.name, ch.kind));
                ch.kind = kind;
                changed += 1;
            }
        }
    }
    changed
}

/// Propagate the kind of every non-standard channel to its dig point.
///
/// The dig point is the first one whose position is within `tol` of the
/// channel's `loc` on every axis. When none is, a point is appended at the
/// channel's location carrying the channel's kind, with `ident` following the
/// last point. An empty dig list gets a fresh [`FIFFV_POINT_EEG`] point.
pub fn adjust_nonstd_chans_dig(info: &mut MeasInfo, tol: f64, log: &dyn MatchLog) {
    for ch in info.chs.iter().filter(|c| non_standard_kind(&c.name).is_some()) {
        let hit = info
            .dig
            .iter_mut()
            .find(|d| positions_within(&d.r, &ch.loc, tol));
        match hit {
            Some(d) => d.kind = ch.kind,
            None => {
                let point = match info.dig.last() {
                    Some(last) => DigPoint { kind: ch.kind, ident: last.ident + 1, r: ch.loc },
                    None => DigPoint { kind: FIFFV_POINT_EEG, ident: 1, r: ch.loc },
                };
                log.debug(&format!("channel {}: no dig point at {:?}, appended", ch.name, ch.loc));
                info.dig.push(point);
            }
        }
    }
}

/// [`adjust_nonstd_chans`] followed by [`adjust_nonstd_chans_dig`].
pub fn adjust_chan_kind(info: &mut MeasInfo, tol: f64, log: &dyn MatchLog) {
    adjust_nonstd_chans(info, log);
    adjust_nonstd_chans_dig(info, tol, log);
}

/// EEG channels only, name → `loc[0..3]`.
pub fn get_chanlocs(info: &MeasInfo, log: &dyn MatchLog) -> Result<ChannelSet> {
    let eeg = info.chs.iter().filter(|c| c.kind == FIFFV_EEG_CH);
    for ch in eeg.clone().filter(|c| has_nan(&c.loc)) {
        log.info(&format!("channel position values are NaN at {} electrode", ch.name));
    }
    ChannelSet::from_channels(eeg.map(|c| ChannelPosition::new(c.name.clone(), c.loc)))
}

pub fn cardinal_point_count(info: &MeasInfo) -> usize {
    info.dig.iter().filter(|d| d.kind == FIFFV_POINT_CARDINAL).count()
}
