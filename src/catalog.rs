//! Standard montage catalog.
//!
//! The catalog is a closed list of layout names ([`MNE_DEFAULT_MONTAGES`]).
//! Positions come from a [`MontageProvider`]: either built in memory or read
//! from a directory of JSON files exported with
//! `mne.channels.make_standard_montage(name).get_positions()["ch_pos"]`.
//!
//! # JSON layout
//! ```text
//! <dir>/standard_1020.json
//! [
//!   { "name": "Fp1", "pos": [-0.0294, 0.0839, -0.0070] },
//!   { "name": "Fpz", "pos": [ 0.0001, 0.0883, -0.0017] },
//!   ...
//! ]
//! ```
//! Array order is the montage's channel order.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::channels::{ChannelPosition, ChannelSet};
use crate::error::{MontageError, Result};
use crate::position::Position;

/// Built-in standard montages, in catalog order.
pub const MNE_DEFAULT_MONTAGES: &[&str] = &[
    "standard_1005",
    "standard_1020",
    "standard_alphabetic",
    "standard_postfixed",
    "standard_prefixed",
    "standard_primed",
    "biosemi16",
    "biosemi32",
    "biosemi64",
    "biosemi128",
    "biosemi160",
    "biosemi256",
    "easycap-M1",
    "easycap-M10",
    "easycap-M43",
    "EGI_256",
    "GSN-HydroCel-32",
    "GSN-HydroCel-64_1.0",
    "GSN-HydroCel-65_1.0",
    "GSN-HydroCel-128",
    "GSN-HydroCel-129",
    "GSN-HydroCel-256",
    "GSN-HydroCel-257",
    "mgh60",
    "mgh70",
    "artinis-octamon",
    "artinis-brite23",
    "brainproducts-RNP-BA-128",
];

/// Resolves a montage name to its reference layout.
pub trait MontageProvider {
    fn montage(&self, name: &str) -> Result<ChannelSet>;
}

/// Montages held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    montages: Vec<(String, ChannelSet)>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a montage.
    pub fn insert(&mut self, name: impl Into<String>, set: ChannelSet) {
        let name = name.into();
        match self.montages.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = set,
            None => self.montages.push((name, set)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, set: ChannelSet) -> Self {
        self.insert(name, set);
        self
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.montages.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.montages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.montages.is_empty()
    }
}

impl MontageProvider for InMemoryCatalog {
    fn montage(&self, name: &str) -> Result<ChannelSet> {
        self.montages
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| MontageError::UnknownMontage(name.to_string()))
    }
}

#[derive(Deserialize)]
struct JsonChannel {
    name: String,
    pos: [Option<f64>; 3],
}

/// Reads `<dir>/<name>.json` on every lookup.
#[derive(Debug, Clone)]
pub struct JsonDirCatalog {
    dir: PathBuf,
}

impl JsonDirCatalog {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Catalog montages that have a file in the directory, in catalog order.
    pub fn available(&self) -> Vec<&'static str> {
        MNE_DEFAULT_MONTAGES
            .iter()
            .copied()
            .filter(|n| self.path_for(n).is_file())
            .collect()
    }
}

impl MontageProvider for JsonDirCatalog {
    fn montage(&self, name: &str) -> Result<ChannelSet> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(MontageError::UnknownMontage(name.to_string()));
        }
        let bytes = std::fs::read(&path)?;
        let entries: Vec<JsonChannel> =
            serde_json::from_slice(&bytes).map_err(|e| MontageError::MontageLoad {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        // `null` coordinates (NaN on export) stay NaN.
        ChannelSet::from_channels(entries.into_iter().map(|e| {
            let pos: Position = e.pos.map(|v| v.unwrap_or(f64::NAN));
            ChannelPosition::new(e.name, pos)
        }))
    }
}
