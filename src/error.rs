//! Error types for roster manipulation and distribution runs.

use thiserror::Error;

/// Errors that can occur while preparing or running a distribution.
///
/// Capacity exhaustion is never an error. A pass that cannot place a
/// patient leaves the patient unassigned and the day report surfaces
/// the count.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistributionError {
    /// An active rounder slot has no starting total census entered.
    #[error("no starting census for {provider} (position {position})")]
    MissingStartingCensus { provider: String, position: u32 },

    /// Rounder positions are not a contiguous run starting at 1.
    #[error("batting order is not contiguous: positions {positions:?}")]
    BrokenBattingOrder { positions: Vec<u32> },

    /// The slot id does not name a rounder slot on this roster.
    #[error("unknown rounder slot: {0}")]
    UnknownSlot(String),
}

impl DistributionError {
    /// Whether the run was refused because a starting census is missing.
    pub fn is_missing_census(&self) -> bool {
        matches!(self, DistributionError::MissingStartingCensus { .. })
    }

    /// Whether an ordering utility found a corrupted batting order.
    pub fn is_order_violation(&self) -> bool {
        matches!(self, DistributionError::BrokenBattingOrder { .. })
    }
}

/// Errors that can occur when fetching the staffing feed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The upstream payload could not be decoded into feed rows.
    #[error("malformed feed payload: {0}")]
    Malformed(String),

    /// The upstream source failed to produce a payload.
    #[error("feed source error: {0}")]
    Source(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DistributionError::MissingStartingCensus {
            provider: "provA".to_string(),
            position: 3,
        };
        assert_eq!(err.to_string(), "no starting census for provA (position 3)");

        let err = DistributionError::UnknownSlot("provZ".to_string());
        assert_eq!(err.to_string(), "unknown rounder slot: provZ");

        let err = FeedError::Malformed("expected an array of rows".to_string());
        assert_eq!(
            err.to_string(),
            "malformed feed payload: expected an array of rows"
        );
    }

    #[test]
    fn test_error_predicates() {
        let missing = DistributionError::MissingStartingCensus {
            provider: "provA".to_string(),
            position: 1,
        };
        assert!(missing.is_missing_census());
        assert!(!missing.is_order_violation());

        let broken = DistributionError::BrokenBattingOrder {
            positions: vec![1, 3, 3],
        };
        assert!(broken.is_order_violation());
        assert!(!broken.is_missing_census());
    }
}
