//! Pre-flight validation for a day's roster.
//!
//! Checks structural integrity of the roster before a distribution
//! run. Detects:
//! - Missing starting censuses on rounder slots
//! - CCU/COVID starting components exceeding the starting total
//! - Capacity limits outside the accepted range
//! - Non-contiguous batting orders
//! - Duplicate providers and duplicate patient sequence numbers
//!
//! The engine refuses to run without starting censuses on its own;
//! this layer exists so census-entry surfaces can report every problem
//! at once instead of failing on the first.

use crate::models::{Roster, MAX_CENSUS_LIMIT};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A rounder slot has no starting total entered.
    MissingStartingCensus,
    /// A starting CCU or COVID count exceeds the starting total.
    ComponentExceedsTotal,
    /// A provider limit falls outside the accepted range.
    CapacityOutOfRange,
    /// Rounder positions are not a contiguous run starting at 1.
    BrokenBattingOrder,
    /// A provider holds more than one slot on the roster.
    DuplicateProvider,
    /// Two patients share a sequence number.
    DuplicateSequence,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a roster ahead of a distribution run.
///
/// Checks:
/// 1. Every rounder slot has a starting total entered
/// 2. Starting CCU/COVID counts do not exceed the starting total
/// 3. Provider limits fall within 0..=30 on every dimension
/// 4. Rounder positions form a contiguous run 1..N
/// 5. No provider appears on two slots
/// 6. No two patients share a sequence number
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_roster(roster: &Roster) -> ValidationResult {
    let mut errors = Vec::new();

    let mut provider_ids = HashSet::new();
    for slot in &roster.slots {
        if !provider_ids.insert(slot.provider.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateProvider,
                format!("Duplicate provider on roster: {}", slot.provider.id),
            ));
        }

        for (dimension, max) in [
            ("total", slot.provider.max_total),
            ("CCU", slot.provider.max_ccu),
            ("COVID", slot.provider.max_covid),
        ] {
            if max > MAX_CENSUS_LIMIT {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CapacityOutOfRange,
                    format!(
                        "{}: max {} census {} exceeds {}",
                        slot.provider.id, dimension, max, MAX_CENSUS_LIMIT
                    ),
                ));
            }
        }

        // Census checks apply to rounders only; secondary slots carry
        // no patients.
        if slot.is_rounder() {
            match slot.starting.coerced() {
                None => errors.push(ValidationError::new(
                    ValidationErrorKind::MissingStartingCensus,
                    format!("No starting census for {}", slot.provider.display_name),
                )),
                Some(start) => {
                    if start.ccu > start.total {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::ComponentExceedsTotal,
                            format!(
                                "{}: starting CCU {} exceeds total {}",
                                slot.provider.id, start.ccu, start.total
                            ),
                        ));
                    }
                    if start.covid > start.total {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::ComponentExceedsTotal,
                            format!(
                                "{}: starting COVID {} exceeds total {}",
                                slot.provider.id, start.covid, start.total
                            ),
                        ));
                    }
                }
            }
        }
    }

    if let Err(err) = roster.verify_batting_order() {
        errors.push(ValidationError::new(
            ValidationErrorKind::BrokenBattingOrder,
            err.to_string(),
        ));
    }

    let mut sequences = HashSet::new();
    for patient in &roster.patients {
        if !sequences.insert(patient.sequence) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSequence,
                format!("Duplicate patient sequence: {}", patient.sequence),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
