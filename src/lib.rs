//! # eegmontage — find the standard montage an EEG recording was made with
//!
//! Recordings often arrive with electrode positions but with vendor-specific
//! channel names (`E1`, `E2`, …) or no montage attached at all. `eegmontage`
//! compares the recording's electrode positions with every layout in a
//! catalog of standard montages, scores each layout, ranks them and lets an
//! operator (or a program) pick one.
//!
//! ## Pipeline overview
//!
//! ```text
//! raw.safetensors (chan_pos, ch_names, ch_kinds)
//!   │
//!   ├─ io::load_recording()      channel records
//!   ├─ info::adjust_chan_kind()  A1/A2 → MISC, EOG/VEOG/… → EOG
//!   ├─ info::get_chanlocs()      EEG channels only: name → [x, y, z]
//!   ├─ position_pipeline()       one MatchResult per catalog montage
//!   │     ├─ distance matrix     recording × montage, Euclidean
//!   │     ├─ mutual nearest nb.  ties invalidate the montage
//!   │     └─ score               mean distance × 100 (999 = invalid)
//!   ├─ rank_montages()           ascending score, stable
//!   └─ evaluate_selection()      1-based pick → montage name
//!        │
//!        └─→ MatchResult::channel_mapping()   rename map for the recording
//! ```
//!
//! ## Quick start
//!
//! ```
//! use eegmontage::{
//!     position_pipeline, rank_montages, evaluate_selection,
//!     ChannelSet, GlobalLog, InMemoryCatalog, MatchConfig,
//! };
//!
//! let layout = ChannelSet::from_pairs([
//!     ("Fz", [0.0, 0.06, 0.06]),
//!     ("Cz", [0.0, 0.0, 0.09]),
//!     ("Pz", [0.0, -0.06, 0.06]),
//! ]).unwrap();
//! let recording = ChannelSet::from_pairs([
//!     ("E1", [0.0, 0.061, 0.059]),
//!     ("E2", [0.0, 0.001, 0.09]),
//!     ("E3", [0.0, -0.06, 0.061]),
//! ]).unwrap();
//!
//! let catalog = InMemoryCatalog::new().with("toy_3ch", layout);
//! let results = position_pipeline(
//!     &recording, &catalog, &["toy_3ch"], &MatchConfig::default(), &GlobalLog,
//! ).unwrap();
//!
//! let ranking = rank_montages(&results).unwrap();
//! assert_eq!(evaluate_selection(1, &ranking).unwrap(), "toy_3ch");
//! assert_eq!(results[0].match_ratio, "3/3");
//! ```

pub mod catalog;
pub mod channels;
pub mod config;
pub mod error;
pub mod info;
pub mod io;
pub mod logging;
pub mod matching;
pub mod position;
pub mod ranking;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config / errors
pub use config::{MatchConfig, PositionMethod, INVALID_POS_SCORE};
pub use error::{MontageError, Result};

// data model
pub use channels::{ChannelPosition, ChannelSet};
pub use position::{position_distance, positions_are_close, positions_within, Position};

// channel metadata
pub use info::{adjust_chan_kind, get_chanlocs, ChannelInfo, DigPoint, MeasInfo};

// catalog
pub use catalog::{InMemoryCatalog, JsonDirCatalog, MontageProvider, MNE_DEFAULT_MONTAGES};

// matching
pub use matching::{
    find_duplicates, match_by_name, match_by_position, match_montage, ChannelMatch, Duplicate,
    MatchResult,
};

// ranking / selection
pub use ranking::{
    evaluate_selection, parse_selection, rank_montages, RankedMontage, Ranking, SelectionRejection,
};

// logging
pub use logging::{GlobalLog, MatchLog, MemoryLog};

/// Match a recording against every named montage.
///
/// Montages are processed in the order of `montage_names`; each one is
/// matched independently with `cfg.method`, so the result for one montage
/// never depends on another.
///
/// # Arguments
///
/// * `recording`     – EEG electrode layout of the recording.
/// * `provider`      – Resolves montage names to layouts.
/// * `montage_names` – Montages to try, usually [`MNE_DEFAULT_MONTAGES`].
/// * `cfg`           – Method and scoring parameters.
/// * `log`           – Receives NaN, tie and per-montage summary records.
///
/// # Errors
///
/// Fails if the provider cannot resolve a montage. Ties and NaN positions are
/// not errors; they show up as `valid == false` / unassigned channels.
pub fn position_pipeline<P, S>(
    recording: &ChannelSet,
    provider: &P,
    montage_names: &[S],
    cfg: &MatchConfig,
    log: &dyn MatchLog,
) -> Result<Vec<MatchResult>>
where
    P: MontageProvider + ?Sized,
    S: AsRef<str>,
{
    montage_names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let montage = provider.montage(name)?;
            Ok(match_montage(recording, name, &montage, cfg, log))
        })
        .collect()
}

/// [`position_pipeline`] with the method given by name.
///
/// The name is validated before any montage is touched: anything other than
/// `"position"` or `"channel_name"` is rejected with
/// [`MontageError::InvalidMethod`].
pub fn position_pipeline_with_method<P, S>(
    recording: &ChannelSet,
    provider: &P,
    montage_names: &[S],
    method: &str,
    log: &dyn MatchLog,
) -> Result<Vec<MatchResult>>
where
    P: MontageProvider + ?Sized,
    S: AsRef<str>,
{
    let method = method.parse::<PositionMethod>().inspect_err(|e| log.error(&e.to_string()))?;
    let cfg = MatchConfig { method, ..MatchConfig::default() };
    position_pipeline(recording, provider, montage_names, &cfg, log)
}
