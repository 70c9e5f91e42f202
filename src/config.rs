//! Matcher configuration.
//!
//! [`MatchConfig`] holds every tunable parameter of a matching run. The
//! defaults reproduce the scoring convention used for ranking montages:
//! mean accepted distance × 100, rounded to 5 decimals.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MontageError;
use crate::position::POSITION_TOLERANCE;

/// Score assigned to a montage that cannot be ranked automatically.
pub const INVALID_POS_SCORE: f64 = 999.0;

/// How recording channels are paired with montage channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionMethod {
    /// Mutual nearest neighbour on 3-D electrode positions.
    #[default]
    Position,
    /// Exact channel-name identity; positions only feed the distance.
    ChannelName,
}

impl FromStr for PositionMethod {
    type Err = MontageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "position" => Ok(Self::Position),
            "channel_name" => Ok(Self::ChannelName),
            other => Err(MontageError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PositionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("position"),
            Self::ChannelName => f.write_str("channel_name"),
        }
    }
}

/// Configuration for a montage matching run.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use eegmontage::{MatchConfig, PositionMethod};
///
/// let cfg = MatchConfig {
///     method: PositionMethod::ChannelName,
///     ..MatchConfig::default()
/// };
/// assert_eq!(cfg.score_decimals, 5);
/// ```
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Matching method.
    ///
    /// Default: [`PositionMethod::Position`].
    pub method: PositionMethod,

    /// Relative per-axis tolerance used by
    /// [`positions_are_close`](crate::position::positions_are_close)
    /// when relating channels to digitisation points.
    ///
    /// Default: `0.015` (±1.5 %).
    pub tolerance: f64,

    /// Multiplier applied to the mean accepted distance.
    ///
    /// Default: `100.0`.
    pub score_scale: f64,

    /// Decimal places kept after scaling.
    ///
    /// Default: `5`.
    pub score_decimals: u32,

    /// How many ranked montages are offered to the operator.
    ///
    /// Default: `5`.
    pub show_n_montages: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            method: PositionMethod::Position,
            tolerance: POSITION_TOLERANCE,
            score_scale: 100.0,
            score_decimals: 5,
            show_n_montages: 5,
        }
    }
}

impl MatchConfig {
    /// Scale and round a mean distance into a montage score.
    ///
    /// ```
    /// use eegmontage::MatchConfig;
    /// let cfg = MatchConfig::default();
    /// assert_eq!(cfg.scale_score(0.0123456789), 1.23457);
    /// ```
    pub fn scale_score(&self, mean_distance: f64) -> f64 {
        let factor = 10f64.powi(self.score_decimals as i32);
        (mean_distance * self.score_scale * factor).round() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_known_names() {
        assert_eq!("position".parse::<PositionMethod>().unwrap(), PositionMethod::Position);
        assert_eq!(
            "channel_name".parse::<PositionMethod>().unwrap(),
            PositionMethod::ChannelName
        );
    }

    #[test]
    fn method_rejects_unknown_name() {
        let err = "nearest".parse::<PositionMethod>().unwrap_err();
        assert!(matches!(err, MontageError::InvalidMethod(ref m) if m == "nearest"));
        assert!(err.to_string().contains("channel_name"));
    }

    #[test]
    fn method_display_round_trips() {
        for m in [PositionMethod::Position, PositionMethod::ChannelName] {
            assert_eq!(m.to_string().parse::<PositionMethod>().unwrap(), m);
        }
    }

    #[test]
    fn default_tolerance_is_position_tolerance() {
        assert_eq!(MatchConfig::default().tolerance, POSITION_TOLERANCE);
    }

    #[test]
    fn scale_score_rounds_to_configured_decimals() {
        let cfg = MatchConfig { score_decimals: 2, ..MatchConfig::default() };
        approx::assert_abs_diff_eq!(cfg.scale_score(0.012345), 1.23, epsilon = 1e-12);
    }
}
