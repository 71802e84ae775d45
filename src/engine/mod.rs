//! The patient distribution engine.
//!
//! Runs one day's roster through a fixed sequence of passes. Earlier
//! passes always outrank later ones: a patient placed by an earlier
//! pass is never revisited.
//!
//! # Algorithm
//!
//! 1. Reset: clear assignments, rebuild all ledgers from the starting censuses
//! 2. Seen bounce-backs: pins booked into all three working ledgers
//! 3. Total-count targets: allocated totals spread one unit at a time
//! 4. Dual-positive placement (CCU and COVID)
//! 5. CCU-only placement
//! 6. COVID-only placement
//! 7. Dual-negative placement, first fit front to back
//! 8. Not-seen bounce-backs: assignment only, no ledger effect
//! 9. Not-seen placement under starting-census guards
//!
//! Passes 4-6 first reserve one destination per patient through the
//! selection primitives, then sort the reserved destinations by
//! batting position and match them to the pass's patients by index.
//! When reservations run short the match truncates, leaving the tail
//! of the patient snapshot unassigned.

mod report;
mod selection;

pub use report::{DayReport, PatientGroups, SlotReport};
pub use selection::{
    admit_not_seen, first_open_slot, reserve_ccu, reserve_covid, reserve_dual_positive,
    reserve_total,
};

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::DistributionError;
use crate::models::{CensusBoard, Patient, Roster};

/// Placement counts from a distribution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub seen_placed: usize,
    pub seen_unassigned: usize,
    pub not_seen_placed: usize,
    pub not_seen_unassigned: usize,
}

/// The multi-pass patient distributor.
///
/// Stateless: every run starts from a clean reset of the roster it is
/// handed, so the run can be repeated after any census or patient edit
/// and lands on the same answer for the same input.
///
/// # Example
///
/// ```
/// use rounds::engine::Distributor;
/// use rounds::models::{Patient, Provider, Role, Roster, RounderSlot, StartingCensus};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2021, 11, 8).unwrap();
/// let mut roster = Roster::new(date)
///     .with_slot(
///         RounderSlot::new(Provider::new("provA"))
///             .with_role(Role::Rounder { sort_key: 1 })
///             .with_position(1)
///             .with_starting(StartingCensus::new(10, 2, 0)),
///     )
///     .with_patient(Patient::new(1).with_ccu(true));
///
/// let summary = Distributor::new().distribute(&mut roster).unwrap();
/// assert_eq!(summary.seen_placed, 1);
/// assert_eq!(roster.patients[0].assigned_to.as_deref(), Some("provA"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Distributor;

impl Distributor {
    pub fn new() -> Self {
        Distributor
    }

    /// Runs every pass in order and summarizes the outcome.
    ///
    /// Refuses to touch the roster while any rounder slot's starting
    /// total is missing.
    pub fn distribute(
        &self,
        roster: &mut Roster,
    ) -> Result<DistributionSummary, DistributionError> {
        info!(
            date = %roster.date,
            rounders = roster.rounder_count(),
            patients = roster.patients.len(),
            "distributing day"
        );
        self.distribute_seen(roster)?;
        self.distribute_not_seen(roster)?;
        let summary = self.summarize(roster);
        if summary.seen_unassigned + summary.not_seen_unassigned > 0 {
            warn!(
                seen = summary.seen_unassigned,
                not_seen = summary.not_seen_unassigned,
                "patients left unassigned"
            );
        }
        info!(
            seen = summary.seen_placed,
            not_seen = summary.not_seen_placed,
            "distribution complete"
        );
        Ok(summary)
    }

    /// Reset plus the seen passes: bounce-backs, total-count targets,
    /// the three affinity placements, and the dual-negative fill.
    pub fn distribute_seen(&self, roster: &mut Roster) -> Result<(), DistributionError> {
        self.reset(roster)?;
        self.assign_seen_bounce_backs(roster);
        self.allocate_totals(roster);
        self.assign_affinity(
            roster,
            |p| p.ccu && p.covid,
            selection::reserve_dual_positive,
            "dual-positive",
        );
        self.assign_affinity(roster, |p| p.ccu && !p.covid, selection::reserve_ccu, "CCU-only");
        self.assign_affinity(
            roster,
            |p| !p.ccu && p.covid,
            selection::reserve_covid,
            "COVID-only",
        );
        self.assign_dual_negative(roster);
        Ok(())
    }

    /// The not-seen passes: pinned not-seen patients first, then the
    /// rest under the starting-census guards. Assumes the seen passes
    /// already ran for the day; never moves a ledger.
    pub fn distribute_not_seen(&self, roster: &mut Roster) -> Result<(), DistributionError> {
        self.fresh_boards(roster)?;
        self.assign_not_seen_bounce_backs(roster);
        self.assign_not_seen(roster);
        Ok(())
    }

    /// Clears every assignment and rebuilds all four ledgers from the
    /// starting censuses. Errors before mutating anything when a
    /// rounder's starting total is missing.
    pub fn reset(&self, roster: &mut Roster) -> Result<(), DistributionError> {
        let boards = self.fresh_boards(roster)?;
        for patient in &mut roster.patients {
            patient.assigned_to = None;
        }
        for (idx, board) in boards {
            roster.slots[idx].board = board;
        }
        debug!("assignments cleared, ledgers rebuilt");
        Ok(())
    }

    fn fresh_boards(
        &self,
        roster: &Roster,
    ) -> Result<Vec<(usize, CensusBoard)>, DistributionError> {
        let mut boards = Vec::new();
        for idx in roster.rounder_order() {
            let slot = &roster.slots[idx];
            let start =
                slot.starting
                    .coerced()
                    .ok_or_else(|| DistributionError::MissingStartingCensus {
                        provider: slot.provider.display_name.clone(),
                        position: slot.position.unwrap_or(0),
                    })?;
            boards.push((idx, CensusBoard::fresh(start)));
        }
        Ok(boards)
    }

    /// Routes each seen pinned patient to its provider's rounder slot,
    /// booking all three working ledgers. Pins override capacity, so
    /// no limit is consulted. A pin to a provider without a rounder
    /// slot today resolves to nothing and the patient stays unassigned.
    fn assign_seen_bounce_backs(&self, roster: &mut Roster) {
        let pinned: Vec<usize> = roster
            .patients
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_seen() && p.is_pinned())
            .map(|(idx, _)| idx)
            .collect();
        let mut booked = 0;
        for p_idx in pinned {
            let pinned_to = roster.patients[p_idx].pinned_to.clone();
            let target = pinned_to
                .as_deref()
                .and_then(|id| roster.rounder_slot_for_provider(id));
            if let Some(slot_idx) = target {
                let (ccu, covid) = (roster.patients[p_idx].ccu, roster.patients[p_idx].covid);
                roster.patients[p_idx].assigned_to = Some(roster.slots[slot_idx].id.clone());
                roster.slots[slot_idx].board.book_bounce(ccu, covid);
                booked += 1;
            }
        }
        debug!(booked, "seen bounce-backs routed");
    }

    /// Spreads one allocated-total unit per seen unpinned patient. The
    /// patients themselves are interchangeable here; only their count
    /// matters.
    fn allocate_totals(&self, roster: &mut Roster) {
        let pool = roster
            .patients
            .iter()
            .filter(|p| p.is_seen() && !p.is_pinned())
            .count();
        let mut reserved = 0;
        for _ in 0..pool {
            if selection::reserve_total(roster).is_some() {
                reserved += 1;
            }
        }
        debug!(pool, reserved, "total-count targets allocated");
    }

    /// Shared shape of the three affinity passes.
    fn assign_affinity(
        &self,
        roster: &mut Roster,
        matches: fn(&Patient) -> bool,
        reserve: fn(&mut Roster) -> Option<usize>,
        pass: &str,
    ) {
        let snapshot: Vec<usize> = roster
            .patients
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_seen() && !p.is_pinned() && matches(p))
            .map(|(idx, _)| idx)
            .collect();
        let mut destinations = Vec::new();
        for _ in &snapshot {
            if let Some(idx) = reserve(roster) {
                destinations.push(idx);
            }
        }
        destinations.sort_by_key(|&idx| roster.slots[idx].position.unwrap_or(u32::MAX));
        let assigned = destinations.len();
        for (&p_idx, &slot_idx) in snapshot.iter().zip(&destinations) {
            let slot_id = roster.slots[slot_idx].id.clone();
            let (ccu, covid) = (roster.patients[p_idx].ccu, roster.patients[p_idx].covid);
            roster.patients[p_idx].assigned_to = Some(slot_id);
            roster.slots[slot_idx].board.assigned.admit(ccu, covid);
        }
        debug!(pass, patients = snapshot.len(), assigned, "affinity pass finished");
    }

    /// Front-to-back fill for unflagged seen patients: each takes the
    /// first slot whose assigned total is still below its target.
    fn assign_dual_negative(&self, roster: &mut Roster) {
        let snapshot: Vec<usize> = roster
            .patients
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_seen() && !p.is_pinned() && !p.ccu && !p.covid)
            .map(|(idx, _)| idx)
            .collect();
        let mut assigned = 0;
        for p_idx in snapshot {
            if let Some(slot_idx) = selection::first_open_slot(roster) {
                roster.patients[p_idx].assigned_to = Some(roster.slots[slot_idx].id.clone());
                roster.slots[slot_idx].board.assigned.total += 1;
                assigned += 1;
            }
        }
        debug!(assigned, "dual-negative fill finished");
    }

    /// Pinned not-seen patients go straight to their provider's slot.
    /// Assignment only: not-seen patients never move a ledger.
    fn assign_not_seen_bounce_backs(&self, roster: &mut Roster) {
        let pinned: Vec<usize> = roster
            .patients
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_seen() && p.is_pinned())
            .map(|(idx, _)| idx)
            .collect();
        let mut routed = 0;
        for p_idx in pinned {
            let pinned_to = roster.patients[p_idx].pinned_to.clone();
            let target = pinned_to
                .as_deref()
                .and_then(|id| roster.rounder_slot_for_provider(id));
            if let Some(slot_idx) = target {
                roster.patients[p_idx].assigned_to = Some(roster.slots[slot_idx].id.clone());
                routed += 1;
            }
        }
        debug!(routed, "not-seen bounce-backs routed");
    }

    /// Places unpinned not-seen patients, dual-burden first, each onto
    /// the slot holding the fewest not-seen patients that admits them.
    /// A patient no slot can admit silently stays unassigned.
    fn assign_not_seen(&self, roster: &mut Roster) {
        let mut snapshot: Vec<usize> = roster
            .patients
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_seen() && !p.is_pinned())
            .map(|(idx, _)| idx)
            .collect();
        snapshot.sort_by_key(|&idx| {
            let p = &roster.patients[idx];
            (Reverse(p.ccu), Reverse(p.covid), p.sequence)
        });
        let mut placed = 0;
        for p_idx in snapshot {
            let patient = roster.patients[p_idx].clone();
            if let Some(slot_idx) = selection::admit_not_seen(roster, &patient) {
                roster.patients[p_idx].assigned_to = Some(roster.slots[slot_idx].id.clone());
                placed += 1;
            }
        }
        debug!(placed, "not-seen placements finished");
    }

    fn summarize(&self, roster: &Roster) -> DistributionSummary {
        let mut summary = DistributionSummary::default();
        for patient in &roster.patients {
            match (patient.is_seen(), patient.is_assigned()) {
                (true, true) => summary.seen_placed += 1,
                (true, false) => summary.seen_unassigned += 1,
                (false, true) => summary.not_seen_placed += 1,
                (false, false) => summary.not_seen_unassigned += 1,
            }
        }
        summary
    }
}

impl Default for Distributor {
    fn default() -> Self {
        Self::new()
    }
}
