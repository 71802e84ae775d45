//! Patient distribution domain models.
//!
//! Core data types for one day of rounding: provider profiles, roster
//! slots in batting order, the per-slot census ledgers, and the
//! patients awaiting assignment.
//!
//! # Domain Mappings
//!
//! | Type | On the ward |
//! |------|-------------|
//! | `Provider` | Physician profile with per-dimension census limits |
//! | `Role` | What the staffing feed scheduled the person to do today |
//! | `RounderSlot` | One provider's place in today's batting order |
//! | `CensusBoard` | A slot's four census ledgers |
//! | `Patient` | One hospitalized patient awaiting assignment |
//! | `Roster` | The whole day: slots plus patients |

mod census;
mod patient;
mod provider;
mod roster;

pub use census::{CensusBoard, CensusSet, StartingCensus};
pub use patient::{AcuityCategory, Patient};
pub use provider::{
    CensusTrack, Provider, Role, DEFAULT_MAX_CENSUS, MANUAL_SORT_KEY, MAX_CENSUS_LIMIT,
};
pub use roster::{Roster, RounderSlot};
