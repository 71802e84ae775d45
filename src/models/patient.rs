//! Patients awaiting assignment.

use serde::{Deserialize, Serialize};

/// Acuity category derived from a patient's CCU/COVID flags. Drives
/// pass membership for seen patients and report grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcuityCategory {
    DualPositive,
    CcuOnly,
    CovidOnly,
    DualNegative,
}

/// One hospitalized patient awaiting assignment for the day.
///
/// Patients are created in bulk by the intake step and then edited
/// individually before the run. The record never carries identifying
/// information, only the handful of flags the passes need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Per-day display sequence, 1-based.
    pub sequence: u32,
    pub ccu: bool,
    pub covid: bool,
    /// Deferred: on the ward but not examined this round.
    pub not_seen: bool,
    /// Continuity-of-care pin to a provider id, if any.
    pub pinned_to: Option<String>,
    /// Slot id of the current assignment, `None` while unassigned.
    pub assigned_to: Option<String>,
}

impl Patient {
    pub fn new(sequence: u32) -> Self {
        Patient {
            sequence,
            ccu: false,
            covid: false,
            not_seen: false,
            pinned_to: None,
            assigned_to: None,
        }
    }

    pub fn with_ccu(mut self, ccu: bool) -> Self {
        self.ccu = ccu;
        self
    }

    pub fn with_covid(mut self, covid: bool) -> Self {
        self.covid = covid;
        self
    }

    pub fn with_not_seen(mut self, not_seen: bool) -> Self {
        self.not_seen = not_seen;
        self
    }

    pub fn with_pin(mut self, provider_id: impl Into<String>) -> Self {
        self.pinned_to = Some(provider_id.into());
        self
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_to.is_some()
    }

    pub fn is_seen(&self) -> bool {
        !self.not_seen
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// Flag-based category, independent of pin and seen state.
    pub fn acuity(&self) -> AcuityCategory {
        match (self.ccu, self.covid) {
            (true, true) => AcuityCategory::DualPositive,
            (true, false) => AcuityCategory::CcuOnly,
            (false, true) => AcuityCategory::CovidOnly,
            (false, false) => AcuityCategory::DualNegative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_patient_defaults() {
        let patient = Patient::new(4);
        assert_eq!(patient.sequence, 4);
        assert!(!patient.ccu);
        assert!(!patient.covid);
        assert!(patient.is_seen());
        assert!(!patient.is_pinned());
        assert!(!patient.is_assigned());
    }

    #[test]
    fn test_acuity_categories() {
        assert_eq!(
            Patient::new(1).with_ccu(true).with_covid(true).acuity(),
            AcuityCategory::DualPositive
        );
        assert_eq!(Patient::new(2).with_ccu(true).acuity(), AcuityCategory::CcuOnly);
        assert_eq!(Patient::new(3).with_covid(true).acuity(), AcuityCategory::CovidOnly);
        assert_eq!(Patient::new(4).acuity(), AcuityCategory::DualNegative);
    }

    #[test]
    fn test_acuity_ignores_pin_and_seen_state() {
        let patient = Patient::new(5)
            .with_ccu(true)
            .with_not_seen(true)
            .with_pin("provA");
        assert_eq!(patient.acuity(), AcuityCategory::CcuOnly);
        assert!(!patient.is_seen());
        assert!(patient.is_pinned());
    }
}
