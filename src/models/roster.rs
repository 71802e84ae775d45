//! The day's roster: provider slots in batting order plus the patient
//! list awaiting distribution.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DistributionError;
use crate::models::census::{CensusBoard, StartingCensus};
use crate::models::patient::Patient;
use crate::models::provider::{Provider, Role, MANUAL_SORT_KEY};

/// One provider's slot on a day's roster.
///
/// A slot exists for every provider the staffing feed scheduled on the
/// day, rounder or not. The provider id doubles as the slot id: a
/// provider holds at most one slot per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RounderSlot {
    pub id: String,
    pub provider: Provider,
    /// Distribution role. `None` excludes the slot from allocation.
    pub role: Option<Role>,
    /// 1-based batting-order position, set only while the slot holds a
    /// rounder role.
    pub position: Option<u32>,
    /// The hand-entered shift-start census.
    pub starting: StartingCensus,
    /// Working ledgers, rebuilt from `starting` at every reset.
    pub board: CensusBoard,
}

impl RounderSlot {
    pub fn new(provider: Provider) -> Self {
        RounderSlot {
            id: provider.id.clone(),
            provider,
            role: None,
            position: None,
            starting: StartingCensus::blank(),
            board: CensusBoard::default(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_starting(mut self, starting: StartingCensus) -> Self {
        self.starting = starting;
        self
    }

    pub fn is_rounder(&self) -> bool {
        matches!(self.role, Some(Role::Rounder { .. }))
    }
}

/// A single day's roster and patient list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub date: NaiveDate,
    pub slots: Vec<RounderSlot>,
    pub patients: Vec<Patient>,
}

impl Roster {
    pub fn new(date: NaiveDate) -> Self {
        Roster {
            date,
            slots: Vec::new(),
            patients: Vec::new(),
        }
    }

    pub fn with_slot(mut self, slot: RounderSlot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patients.push(patient);
        self
    }

    /// Indices of rounder slots in ascending batting order. Passes
    /// capture this once at entry and iterate the snapshot while the
    /// ledgers mutate underneath.
    pub fn rounder_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_rounder())
            .map(|(idx, _)| idx)
            .collect();
        order.sort_by_key(|&idx| self.slots[idx].position.unwrap_or(u32::MAX));
        order
    }

    pub fn rounder_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_rounder()).count()
    }

    pub fn slot(&self, slot_id: &str) -> Option<&RounderSlot> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }

    pub fn slot_mut(&mut self, slot_id: &str) -> Option<&mut RounderSlot> {
        self.slots.iter_mut().find(|slot| slot.id == slot_id)
    }

    pub fn slot_index(&self, slot_id: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.id == slot_id)
    }

    /// Index of the rounder slot held by the given provider, if any.
    /// Bounce-back routing resolves pins through this: a pin to a
    /// provider without a rounder slot today resolves to nothing.
    pub fn rounder_slot_for_provider(&self, provider_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.is_rounder() && slot.provider.id == provider_id)
    }

    /// Patients currently assigned to the slot, in sequence order.
    pub fn patients_assigned_to(&self, slot_id: &str) -> Vec<&Patient> {
        self.patients
            .iter()
            .filter(|patient| patient.assigned_to.as_deref() == Some(slot_id))
            .collect()
    }

    /// Returns the index of the provider's slot, appending a fresh
    /// roleless slot when the provider is not on the roster yet.
    pub fn ensure_slot(&mut self, provider: Provider) -> usize {
        if let Some(idx) = self.slots.iter().position(|slot| slot.provider.id == provider.id) {
            return idx;
        }
        self.slots.push(RounderSlot::new(provider));
        self.slots.len() - 1
    }

    /// Assigns a role to the slot at `idx`.
    ///
    /// A rounder role is exclusive: any other slot holding an equal
    /// rounder role is vacated (role and position cleared). A
    /// secondary classification never downgrades a slot that already
    /// holds a rounder role.
    pub fn assign_role_at(&mut self, idx: usize, role: Role) {
        match role {
            Role::Rounder { .. } => {
                for (other, slot) in self.slots.iter_mut().enumerate() {
                    if other != idx && slot.role == Some(role) {
                        slot.role = None;
                        slot.position = None;
                    }
                }
                self.slots[idx].role = Some(role);
            }
            Role::Secondary => {
                if !self.slots[idx].is_rounder() {
                    self.slots[idx].role = Some(Role::Secondary);
                }
            }
        }
    }

    /// Id-keyed variant of [`assign_role_at`](Self::assign_role_at).
    pub fn assign_role(&mut self, slot_id: &str, role: Role) -> Result<(), DistributionError> {
        let idx = self
            .slot_index(slot_id)
            .ok_or_else(|| DistributionError::UnknownSlot(slot_id.to_string()))?;
        self.assign_role_at(idx, role);
        Ok(())
    }

    /// Orders rounder slots by role sort key and numbers their
    /// positions 1..N. Ties keep roster order.
    pub fn init_batting_order(&mut self) {
        let mut rounders: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_rounder())
            .map(|(idx, _)| idx)
            .collect();
        rounders.sort_by_key(|&idx| match self.slots[idx].role {
            Some(Role::Rounder { sort_key }) => sort_key,
            _ => i32::MAX,
        });
        for (rank, &idx) in rounders.iter().enumerate() {
            self.slots[idx].position = Some(rank as u32 + 1);
        }
    }

    /// Adds the provider as a rounder at the tail of the batting
    /// order, with the manual sort key and a blank starting census.
    /// A provider already holding a rounder slot is left untouched;
    /// one holding a secondary slot is upgraded in place.
    pub fn append_rounder(&mut self, provider: Provider) -> usize {
        let idx = self.ensure_slot(provider);
        if self.slots[idx].is_rounder() {
            return idx;
        }
        let tail = self.rounder_count() as u32 + 1;
        self.slots[idx].role = Some(Role::Rounder {
            sort_key: MANUAL_SORT_KEY,
        });
        self.slots[idx].position = Some(tail);
        idx
    }

    /// Replaces the day's patients with `count` fresh records numbered
    /// from 1. Flag edits happen per patient afterwards.
    pub fn set_patient_count(&mut self, count: u32) {
        self.patients = (1..=count).map(Patient::new).collect();
    }

    /// Checks that rounder positions form a contiguous run 1..N.
    pub fn verify_batting_order(&self) -> Result<(), DistributionError> {
        let rounders = self.rounder_count();
        let mut positions: Vec<u32> = self
            .slots
            .iter()
            .filter(|slot| slot.is_rounder())
            .filter_map(|slot| slot.position)
            .collect();
        positions.sort_unstable();
        let contiguous = positions.len() == rounders
            && positions
                .iter()
                .enumerate()
                .all(|(rank, &pos)| pos == rank as u32 + 1);
        if contiguous {
            Ok(())
        } else {
            Err(DistributionError::BrokenBattingOrder { positions })
        }
    }

    /// Cyclically rotates the batting order so the given slot becomes
    /// next up at position 1, preserving relative order. Applied only
    /// after the current order verifies, so a failure leaves the
    /// roster unchanged.
    pub fn promote_to_next_up(&mut self, slot_id: &str) -> Result<(), DistributionError> {
        self.verify_batting_order()?;
        let (_, target_pos) = self.rounder_position(slot_id)?;
        let count = self.rounder_count() as u32;
        let moves: Vec<(usize, u32)> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_rounder())
            .filter_map(|(idx, slot)| slot.position.map(|pos| (idx, pos)))
            .map(|(idx, pos)| (idx, ((pos + count - target_pos) % count) + 1))
            .collect();
        for (idx, pos) in moves {
            self.slots[idx].position = Some(pos);
        }
        Ok(())
    }

    /// Swaps the slot with its batting-order predecessor. A slot
    /// already at position 1 stays put.
    pub fn shift_up(&mut self, slot_id: &str) -> Result<(), DistributionError> {
        self.verify_batting_order()?;
        let (target_idx, target_pos) = self.rounder_position(slot_id)?;
        if target_pos <= 1 {
            return Ok(());
        }
        let above = self
            .slots
            .iter()
            .position(|slot| slot.is_rounder() && slot.position == Some(target_pos - 1))
            .ok_or_else(|| DistributionError::BrokenBattingOrder {
                positions: vec![target_pos],
            })?;
        self.slots[above].position = Some(target_pos);
        self.slots[target_idx].position = Some(target_pos - 1);
        Ok(())
    }

    /// Removes the slot from the roster and closes the gap above it.
    /// Patients assigned to the removed slot revert to unassigned.
    pub fn remove_rounder(&mut self, slot_id: &str) -> Result<(), DistributionError> {
        self.verify_batting_order()?;
        let (target_idx, target_pos) = self.rounder_position(slot_id)?;
        for patient in &mut self.patients {
            if patient.assigned_to.as_deref() == Some(slot_id) {
                patient.assigned_to = None;
            }
        }
        self.slots.remove(target_idx);
        for slot in &mut self.slots {
            if let Some(pos) = slot.position {
                if slot.is_rounder() && pos > target_pos {
                    slot.position = Some(pos - 1);
                }
            }
        }
        Ok(())
    }

    fn rounder_position(&self, slot_id: &str) -> Result<(usize, u32), DistributionError> {
        self.slots
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.id == slot_id && slot.is_rounder())
            .and_then(|(idx, slot)| slot.position.map(|pos| (idx, pos)))
            .ok_or_else(|| DistributionError::UnknownSlot(slot_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::census::CensusSet;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 11, 8).unwrap()
    }

    fn rounder(id: &str, position: u32) -> RounderSlot {
        RounderSlot::new(Provider::new(id))
            .with_role(Role::Rounder {
                sort_key: position as i32,
            })
            .with_position(position)
    }

    /// provA..provD entered out of batting order on purpose.
    fn four_rounders() -> Roster {
        Roster::new(day())
            .with_slot(rounder("provA", 3))
            .with_slot(rounder("provB", 1))
            .with_slot(rounder("provC", 2))
            .with_slot(rounder("provD", 4))
    }

    fn order_of(roster: &Roster) -> Vec<&str> {
        roster
            .rounder_order()
            .into_iter()
            .map(|idx| roster.slots[idx].id.as_str())
            .collect()
    }

    #[test]
    fn test_rounder_order_follows_positions() {
        let roster = four_rounders();
        assert_eq!(order_of(&roster), vec!["provB", "provC", "provA", "provD"]);
    }

    #[test]
    fn test_rounder_order_skips_secondary_slots() {
        let mut roster = four_rounders();
        let idx = roster.ensure_slot(Provider::new("provE"));
        roster.assign_role_at(idx, Role::Secondary);
        assert_eq!(roster.rounder_count(), 4);
        assert_eq!(order_of(&roster), vec!["provB", "provC", "provA", "provD"]);
    }

    #[test]
    fn test_init_batting_order_sorts_by_sort_key() {
        let mut roster = Roster::new(day());
        for (id, sort_key) in [("provA", 3), ("provB", 0), ("provC", 20), ("provD", 1)] {
            let idx = roster.ensure_slot(Provider::new(id));
            roster.assign_role_at(idx, Role::Rounder { sort_key });
        }
        roster.init_batting_order();
        assert_eq!(order_of(&roster), vec!["provB", "provD", "provA", "provC"]);
    }

    #[test]
    fn test_init_batting_order_keeps_roster_order_on_ties() {
        let mut roster = Roster::new(day());
        for id in ["provA", "provB"] {
            let idx = roster.ensure_slot(Provider::new(id));
            roster.assign_role_at(idx, Role::Rounder { sort_key: 0 });
        }
        roster.init_batting_order();
        assert_eq!(order_of(&roster), vec!["provA", "provB"]);
    }

    #[test]
    fn test_assign_rounder_role_vacates_duplicate_holder() {
        let mut roster = four_rounders();
        roster
            .assign_role("provD", Role::Rounder { sort_key: 1 })
            .unwrap();
        let prior = roster.slot("provB").unwrap();
        assert_eq!(prior.role, None);
        assert_eq!(prior.position, None);
        assert!(roster.slot("provD").unwrap().is_rounder());
    }

    #[test]
    fn test_secondary_never_downgrades_a_rounder() {
        let mut roster = four_rounders();
        roster.assign_role("provA", Role::Secondary).unwrap();
        let slot = roster.slot("provA").unwrap();
        assert!(slot.is_rounder());
        assert_eq!(slot.position, Some(3));
    }

    #[test]
    fn test_append_rounder_joins_at_tail() {
        let mut roster = four_rounders();
        let idx = roster.append_rounder(Provider::new("provE"));
        let slot = &roster.slots[idx];
        assert_eq!(slot.role, Some(Role::Rounder { sort_key: MANUAL_SORT_KEY }));
        assert_eq!(slot.position, Some(5));
        assert_eq!(slot.starting, StartingCensus::blank());
    }

    #[test]
    fn test_append_rounder_upgrades_secondary_in_place() {
        let mut roster = four_rounders();
        let idx = roster.ensure_slot(Provider::new("provE"));
        roster.assign_role_at(idx, Role::Secondary);
        assert_eq!(roster.append_rounder(Provider::new("provE")), idx);
        assert_eq!(roster.slots[idx].position, Some(5));
        assert_eq!(roster.rounder_count(), 5);
    }

    #[test]
    fn test_append_rounder_leaves_existing_rounder_alone() {
        let mut roster = four_rounders();
        roster.append_rounder(Provider::new("provA"));
        assert_eq!(roster.slot("provA").unwrap().position, Some(3));
        assert_eq!(roster.rounder_count(), 4);
    }

    #[test]
    fn test_promote_rotates_cyclically() {
        let mut roster = four_rounders();
        roster.promote_to_next_up("provA").unwrap();
        assert_eq!(order_of(&roster), vec!["provA", "provD", "provB", "provC"]);
        assert_eq!(roster.slot("provA").unwrap().position, Some(1));
    }

    #[test]
    fn test_promote_of_next_up_is_identity() {
        let mut roster = four_rounders();
        roster.promote_to_next_up("provB").unwrap();
        assert_eq!(order_of(&roster), vec!["provB", "provC", "provA", "provD"]);
    }

    #[test]
    fn test_shift_up_swaps_with_predecessor() {
        let mut roster = four_rounders();
        roster.shift_up("provA").unwrap();
        assert_eq!(order_of(&roster), vec!["provB", "provA", "provC", "provD"]);
    }

    #[test]
    fn test_shift_up_at_head_is_a_noop() {
        let mut roster = four_rounders();
        roster.shift_up("provB").unwrap();
        assert_eq!(order_of(&roster), vec!["provB", "provC", "provA", "provD"]);
    }

    #[test]
    fn test_remove_rounder_closes_the_gap() {
        let mut roster = four_rounders();
        roster.patients.push(Patient::new(1));
        roster.patients[0].assigned_to = Some("provC".to_string());
        roster.remove_rounder("provC").unwrap();
        assert_eq!(order_of(&roster), vec!["provB", "provA", "provD"]);
        assert_eq!(roster.slot("provA").unwrap().position, Some(2));
        assert_eq!(roster.slot("provD").unwrap().position, Some(3));
        assert_eq!(roster.patients[0].assigned_to, None);
    }

    #[test]
    fn test_ordering_utilities_reject_broken_orders() {
        let mut roster = four_rounders();
        roster.slot_mut("provC").unwrap().position = Some(4);
        let err = roster.promote_to_next_up("provA").unwrap_err();
        assert!(err.is_order_violation());
        // Nothing moved.
        assert_eq!(roster.slot("provA").unwrap().position, Some(3));
        assert!(roster.shift_up("provA").unwrap_err().is_order_violation());
        assert!(roster.remove_rounder("provA").unwrap_err().is_order_violation());
    }

    #[test]
    fn test_unknown_slot_errors() {
        let mut roster = four_rounders();
        assert_eq!(
            roster.assign_role("provZ", Role::Secondary).unwrap_err(),
            DistributionError::UnknownSlot("provZ".to_string())
        );
        assert!(roster.promote_to_next_up("provZ").is_err());
    }

    #[test]
    fn test_set_patient_count_replaces_the_day() {
        let mut roster = four_rounders();
        roster.set_patient_count(3);
        roster.patients[1].ccu = true;
        roster.set_patient_count(2);
        assert_eq!(roster.patients.len(), 2);
        assert_eq!(roster.patients[0].sequence, 1);
        assert_eq!(roster.patients[1].sequence, 2);
        assert!(!roster.patients[1].ccu);
    }

    #[test]
    fn test_slot_board_defaults_to_zero() {
        let slot = RounderSlot::new(Provider::new("provA"));
        assert_eq!(slot.board.starting, CensusSet::default());
        assert_eq!(slot.id, "provA");
    }
}
