//! Named electrode layouts.
//!
//! A [`ChannelSet`] is either a recording's EEG electrodes or a standard
//! montage's reference layout. Insertion order is kept: it decides which
//! repeated assignment counts as the duplicate and is the catalog order
//! montage channels are reported in.
use serde::{Deserialize, Serialize};

use crate::error::{MontageError, Result};
use crate::position::{has_nan, Position};

/// One named electrode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPosition {
    pub name: String,
    pub pos: Position,
}

impl ChannelPosition {
    pub fn new(name: impl Into<String>, pos: Position) -> Self {
        Self { name: name.into(), pos }
    }

    /// `false` when any coordinate is NaN.
    #[inline]
    pub fn is_matchable(&self) -> bool {
        !has_nan(&self.pos)
    }
}

/// Ordered name → position mapping with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelSet {
    channels: Vec<ChannelPosition>,
}

impl ChannelSet {
    /// Build from `(name, position)` pairs. Fails on a repeated name.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Position)>,
        S: Into<String>,
    {
        Self::from_channels(pairs.into_iter().map(|(n, p)| ChannelPosition::new(n, p)))
    }

    pub fn from_channels<I>(channels: I) -> Result<Self>
    where
        I: IntoIterator<Item = ChannelPosition>,
    {
        let mut out: Vec<ChannelPosition> = Vec::new();
        for ch in channels {
            if out.iter().any(|c| c.name == ch.name) {
                return Err(MontageError::DuplicateChannel(ch.name));
            }
            out.push(ch);
        }
        Ok(Self { channels: out })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChannelPosition> {
        self.channels.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Position> {
        self.channels.iter().find(|c| c.name == name).map(|c| &c.pos)
    }

    /// Channels with at least one NaN coordinate.
    pub fn unmatchable(&self) -> impl Iterator<Item = &ChannelPosition> {
        self.channels.iter().filter(|c| !c.is_matchable())
    }
}

impl<'a> IntoIterator for &'a ChannelSet {
    type Item = &'a ChannelPosition;
    type IntoIter = std::slice::Iter<'a, ChannelPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let set = ChannelSet::from_pairs([
            ("Fz", [0.0, 0.06, 0.06]),
            ("Cz", [0.0, 0.0, 0.09]),
            ("Pz", [0.0, -0.06, 0.06]),
        ])
        .unwrap();
        assert_eq!(set.names(), vec!["Fz", "Cz", "Pz"]);
        assert_eq!(set.get("Cz"), Some(&[0.0, 0.0, 0.09]));
        assert!(set.get("Oz").is_none());
    }

    #[test]
    fn rejects_repeated_name() {
        let err = ChannelSet::from_pairs([("Cz", [0.0; 3]), ("Cz", [1.0; 3])]).unwrap_err();
        assert!(matches!(err, MontageError::DuplicateChannel(ref n) if n == "Cz"));
    }

    #[test]
    fn nan_channel_is_unmatchable() {
        let set = ChannelSet::from_pairs([
            ("Fz", [0.0, 0.06, 0.06]),
            ("EXG1", [f64::NAN, f64::NAN, f64::NAN]),
        ])
        .unwrap();
        let bad: Vec<_> = set.unmatchable().map(|c| c.name.as_str()).collect();
        assert_eq!(bad, vec!["EXG1"]);
    }
}
