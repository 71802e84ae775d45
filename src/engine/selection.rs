//! Slot-selection primitives for the allocation passes.
//!
//! Each primitive scans the rounder slots in ascending batting order
//! and keeps the best candidate seen so far. The reserving primitives
//! mutate the chosen slot's allocated ledger before returning, so a
//! sequence of calls spreads reservations across the order instead of
//! piling them onto one slot.
//!
//! # Selection Convention
//!
//! - Lower score wins: fewest allocated, lightest carriage
//! - Candidates replace on `<=`, so among exact ties the slot scanned
//!   last, the one highest in batting position, takes the patient
//! - `None` means no slot can take the patient; callers leave the
//!   patient unassigned and move on

use crate::models::{Patient, Roster};

/// Reserves one unit of total census on the least-loaded open slot.
///
/// Returns the chosen slot index after incrementing its allocated
/// total, or `None` when every rounder sits at its total limit.
pub fn reserve_total(roster: &mut Roster) -> Option<usize> {
    let order = roster.rounder_order();
    let mut lowest = u32::MAX;
    let mut chosen = None;
    for &idx in &order {
        let slot = &roster.slots[idx];
        let total = slot.board.allocated.total;
        if total <= lowest && total < slot.provider.max_total {
            chosen = Some(idx);
            lowest = total;
        }
    }
    if let Some(idx) = chosen {
        roster.slots[idx].board.allocated.total += 1;
    }
    chosen
}

/// Reserves a dual-positive placement on the slot carrying the least
/// combined acuity burden.
///
/// Eligibility requires CCU-dimension slack plus headroom under both
/// the CCU and COVID limits; the winner takes an allocated CCU and
/// COVID increment. Its total was already reserved by the total-count
/// pass.
pub fn reserve_dual_positive(roster: &mut Roster) -> Option<usize> {
    let order = roster.rounder_order();
    // Carriage never exceeds 2.0, so 2.0 is the open sentinel.
    let mut lowest = 2.0_f64;
    let mut chosen = None;
    for &idx in &order {
        let slot = &roster.slots[idx];
        if slot.board.has_ccu_slack()
            && slot.board.allocated.ccu < slot.provider.max_ccu
            && slot.board.allocated.covid < slot.provider.max_covid
        {
            let carriage = slot.board.carriage();
            if carriage <= lowest {
                chosen = Some(idx);
                lowest = carriage;
            }
        }
    }
    if let Some(idx) = chosen {
        let board = &mut roster.slots[idx].board;
        board.allocated.ccu += 1;
        board.allocated.covid += 1;
    }
    chosen
}

/// Reserves a CCU placement on the slot with the fewest allocated CCU
/// patients among those with CCU slack and CCU headroom.
pub fn reserve_ccu(roster: &mut Roster) -> Option<usize> {
    let order = roster.rounder_order();
    let mut lowest = u32::MAX;
    let mut chosen = None;
    for &idx in &order {
        let slot = &roster.slots[idx];
        if slot.board.has_ccu_slack()
            && slot.board.allocated.ccu <= lowest
            && slot.board.allocated.ccu < slot.provider.max_ccu
        {
            chosen = Some(idx);
            lowest = slot.board.allocated.ccu;
        }
    }
    if let Some(idx) = chosen {
        roster.slots[idx].board.allocated.ccu += 1;
    }
    chosen
}

/// COVID counterpart of [`reserve_ccu`].
pub fn reserve_covid(roster: &mut Roster) -> Option<usize> {
    let order = roster.rounder_order();
    let mut lowest = u32::MAX;
    let mut chosen = None;
    for &idx in &order {
        let slot = &roster.slots[idx];
        if slot.board.has_covid_slack()
            && slot.board.allocated.covid <= lowest
            && slot.board.allocated.covid < slot.provider.max_covid
        {
            chosen = Some(idx);
            lowest = slot.board.allocated.covid;
        }
    }
    if let Some(idx) = chosen {
        roster.slots[idx].board.allocated.covid += 1;
    }
    chosen
}

/// First slot in batting order whose assigned total is still below its
/// allocated target. Dual-negative placement fills front to back, so
/// this one does not tie-break.
pub fn first_open_slot(roster: &Roster) -> Option<usize> {
    roster.rounder_order().into_iter().find(|&idx| {
        let board = &roster.slots[idx].board;
        board.assigned.total < board.allocated.total
    })
}

/// Slot with the fewest assigned not-seen patients that can admit the
/// given patient.
///
/// Not-seen guards ignore the working ledgers entirely. Each flag the
/// patient carries is checked against the starting census plus the
/// not-seen patients already assigned to the slot, and the total guard
/// always applies. Callers verify starting censuses up front; a blank
/// entry counts as zero here.
pub fn admit_not_seen(roster: &Roster, patient: &Patient) -> Option<usize> {
    let order = roster.rounder_order();
    let mut fewest = u32::MAX;
    let mut chosen = None;
    for &idx in &order {
        let slot = &roster.slots[idx];
        let start = slot.starting.coerced().unwrap_or_default();
        let (held, held_ccu, held_covid) = not_seen_held(roster, &slot.id);
        if patient.ccu && start.ccu + held_ccu >= slot.provider.max_ccu {
            continue;
        }
        if patient.covid && start.covid + held_covid >= slot.provider.max_covid {
            continue;
        }
        if start.total + held >= slot.provider.max_total {
            continue;
        }
        if held <= fewest {
            chosen = Some(idx);
            fewest = held;
        }
    }
    chosen
}

/// Not-seen patients currently assigned to the slot: the total count
/// plus the CCU and COVID flagged subsets.
fn not_seen_held(roster: &Roster, slot_id: &str) -> (u32, u32, u32) {
    let mut held = (0, 0, 0);
    for patient in &roster.patients {
        if patient.not_seen && patient.assigned_to.as_deref() == Some(slot_id) {
            held.0 += 1;
            if patient.ccu {
                held.1 += 1;
            }
            if patient.covid {
                held.2 += 1;
            }
        }
    }
    held
}
