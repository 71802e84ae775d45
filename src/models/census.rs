//! Census ledgers.
//!
//! Every rounder slot carries four parallel census ledgers, each a
//! total/CCU/COVID triple:
//!
//! - **starting**: the hand-entered census at shift start
//! - **post-bounce**: starting plus seen bounce-backs, frozen after the
//!   bounce-back pass as an audit snapshot
//! - **allocated**: the target census the allocation passes reserve into
//! - **assigned**: the census actually booked so far
//!
//! A reset recreates all four from the starting entry, so a
//! distribution run can be repeated from scratch at any time.

use serde::{Deserialize, Serialize};

/// A census triple: total patients plus the CCU and COVID subsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusSet {
    pub total: u32,
    pub ccu: u32,
    pub covid: u32,
}

impl CensusSet {
    pub fn new(total: u32, ccu: u32, covid: u32) -> Self {
        CensusSet { total, ccu, covid }
    }

    /// Counts one patient with the given flags into the triple.
    pub fn admit(&mut self, ccu: bool, covid: bool) {
        self.total += 1;
        if ccu {
            self.ccu += 1;
        }
        if covid {
            self.covid += 1;
        }
    }
}

/// The hand-entered shift-start census for one rounder slot.
///
/// Fields stay `None` until entered. A blank CCU or COVID count is
/// treated as zero, but a blank total blocks every distribution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingCensus {
    pub total: Option<u32>,
    pub ccu: Option<u32>,
    pub covid: Option<u32>,
}

impl StartingCensus {
    pub fn new(total: u32, ccu: u32, covid: u32) -> Self {
        StartingCensus {
            total: Some(total),
            ccu: Some(ccu),
            covid: Some(covid),
        }
    }

    /// An empty entry, the state of a freshly created slot.
    pub fn blank() -> Self {
        StartingCensus::default()
    }

    /// Whether the mandatory total has been entered.
    pub fn is_entered(&self) -> bool {
        self.total.is_some()
    }

    /// Snapshot with blank CCU/COVID coerced to zero, or `None` when
    /// the mandatory total is missing.
    pub fn coerced(&self) -> Option<CensusSet> {
        self.total.map(|total| CensusSet {
            total,
            ccu: self.ccu.unwrap_or(0),
            covid: self.covid.unwrap_or(0),
        })
    }
}

/// The four per-slot ledgers, recreated from the starting census at
/// every reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusBoard {
    pub starting: CensusSet,
    pub post_bounce: CensusSet,
    pub allocated: CensusSet,
    pub assigned: CensusSet,
}

impl CensusBoard {
    /// A fresh board with all four ledgers at the starting census.
    pub fn fresh(starting: CensusSet) -> Self {
        CensusBoard {
            starting,
            post_bounce: starting,
            allocated: starting,
            assigned: starting,
        }
    }

    /// Books a bounce-back into all three working ledgers. Bounce-backs
    /// bypass capacity, so no limit is consulted here.
    pub fn book_bounce(&mut self, ccu: bool, covid: bool) {
        self.post_bounce.admit(ccu, covid);
        self.allocated.admit(ccu, covid);
        self.assigned.admit(ccu, covid);
    }

    /// Whether unconsumed total allocation exceeds the pending CCU
    /// commitments. A slot only accepts another CCU patient while the
    /// headroom between target and booked totals is strictly larger
    /// than the CCU placements still owed.
    pub fn has_ccu_slack(&self) -> bool {
        i64::from(self.allocated.total) - i64::from(self.assigned.total)
            > i64::from(self.allocated.ccu) - i64::from(self.assigned.ccu)
    }

    /// COVID counterpart of [`has_ccu_slack`](Self::has_ccu_slack).
    pub fn has_covid_slack(&self) -> bool {
        i64::from(self.allocated.total) - i64::from(self.assigned.total)
            > i64::from(self.allocated.covid) - i64::from(self.assigned.covid)
    }

    /// Proportional acuity burden of the allocated ledger:
    /// `(COVID rate)^2 + (CCU rate)^2`. Lower carries less burden.
    ///
    /// Callers check slack first; a slot with a zero allocated total
    /// never has slack, so the rates are always well defined.
    pub fn carriage(&self) -> f64 {
        let total = f64::from(self.allocated.total);
        let covid_rate = f64::from(self.allocated.covid) / total;
        let ccu_rate = f64::from(self.allocated.ccu) / total;
        covid_rate * covid_rate + ccu_rate * ccu_rate
    }
}
