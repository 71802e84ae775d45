//! Day-report assembly.
//!
//! Reads the roster's final assignment state into the structure the
//! hand-off email renders: one section per rounder slot in batting
//! order, patients grouped into the six hand-off categories, plus the
//! leftover pool of unassigned patients.

use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AcuityCategory, CensusSet, Patient, Roster};

/// Patients of one slot (or of the unassigned pool) in the six
/// hand-off categories. Category membership comes from the patient's
/// own flags: a pinned patient reports as a bounce-back whatever its
/// acuity, and a not-seen patient reports as not-seen whatever else
/// is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientGroups {
    pub bounce_back: Vec<Patient>,
    pub dual_positive: Vec<Patient>,
    pub ccu_only: Vec<Patient>,
    pub covid_only: Vec<Patient>,
    pub dual_negative: Vec<Patient>,
    /// Ordered pinned first, then CCU before COVID before unflagged.
    pub not_seen: Vec<Patient>,
}

impl PatientGroups {
    fn collect<'a>(patients: impl Iterator<Item = &'a Patient>) -> Self {
        let mut groups = PatientGroups::default();
        for patient in patients {
            if patient.not_seen {
                groups.not_seen.push(patient.clone());
            } else if patient.is_pinned() {
                groups.bounce_back.push(patient.clone());
            } else {
                match patient.acuity() {
                    AcuityCategory::DualPositive => groups.dual_positive.push(patient.clone()),
                    AcuityCategory::CcuOnly => groups.ccu_only.push(patient.clone()),
                    AcuityCategory::CovidOnly => groups.covid_only.push(patient.clone()),
                    AcuityCategory::DualNegative => groups.dual_negative.push(patient.clone()),
                }
            }
        }
        groups
            .not_seen
            .sort_by_key(|p| (Reverse(p.is_pinned()), Reverse(p.ccu), Reverse(p.covid)));
        groups
    }

    pub fn len(&self) -> usize {
        self.bounce_back.len()
            + self.dual_positive.len()
            + self.ccu_only.len()
            + self.covid_only.len()
            + self.dual_negative.len()
            + self.not_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One rounder slot's section of the day report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotReport {
    pub slot_id: String,
    pub provider: String,
    pub position: u32,
    /// Final booked census.
    pub assigned: CensusSet,
    /// Census right after the bounce-back pass, kept for audit.
    pub post_bounce: CensusSet,
    pub groups: PatientGroups,
}

/// The whole day's assignment report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayReport {
    pub date: NaiveDate,
    /// Rounder sections in batting order.
    pub slots: Vec<SlotReport>,
    pub unassigned: PatientGroups,
    /// How many unassigned seen patients there are, with their CCU and
    /// COVID subsets. Counts of patients, not census points.
    pub unassigned_seen: CensusSet,
}

impl DayReport {
    /// Reads the roster's current state into a report. Purely a read:
    /// call it after the distribution run of interest.
    pub fn assemble(roster: &Roster) -> Self {
        let slots = roster
            .rounder_order()
            .into_iter()
            .map(|idx| {
                let slot = &roster.slots[idx];
                SlotReport {
                    slot_id: slot.id.clone(),
                    provider: slot.provider.display_name.clone(),
                    position: slot.position.unwrap_or(0),
                    assigned: slot.board.assigned,
                    post_bounce: slot.board.post_bounce,
                    groups: PatientGroups::collect(
                        roster.patients_assigned_to(&slot.id).into_iter(),
                    ),
                }
            })
            .collect();

        let unassigned =
            PatientGroups::collect(roster.patients.iter().filter(|p| !p.is_assigned()));
        let mut unassigned_seen = CensusSet::default();
        for patient in roster.patients.iter().filter(|p| !p.is_assigned()) {
            if patient.is_seen() {
                unassigned_seen.admit(patient.ccu, patient.covid);
            }
        }

        DayReport {
            date: roster.date,
            slots,
            unassigned,
            unassigned_seen,
        }
    }
}
