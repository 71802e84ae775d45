//! Provider profiles and their distribution roles.

use serde::{Deserialize, Serialize};

/// Default per-dimension census limit for a new provider profile.
pub const DEFAULT_MAX_CENSUS: u32 = 17;

/// Upper bound accepted for any census limit.
pub const MAX_CENSUS_LIMIT: u32 = 30;

/// Sort key given to rounders added by hand after a feed import, so
/// they fall in behind the feed's numbered rounding tasks.
pub const MANUAL_SORT_KEY: i32 = 20;

/// A physician profile with per-dimension capacity limits.
///
/// Profiles persist across days; a day's participation is recorded by
/// a [`RounderSlot`](crate::models::RounderSlot) referencing the
/// profile. The id is the staffing feed's abbreviation for the person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    /// Name shown in rosters and reports.
    pub display_name: String,
    pub max_total: u32,
    pub max_ccu: u32,
    pub max_covid: u32,
}

impl Provider {
    /// Creates a profile with the default limits and the id doubling
    /// as the display name.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Provider {
            display_name: id.clone(),
            id,
            max_total: DEFAULT_MAX_CENSUS,
            max_ccu: DEFAULT_MAX_CENSUS,
            max_covid: DEFAULT_MAX_CENSUS,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_max_total(mut self, max: u32) -> Self {
        self.max_total = max;
        self
    }

    pub fn with_max_ccu(mut self, max: u32) -> Self {
        self.max_ccu = max;
        self
    }

    pub fn with_max_covid(mut self, max: u32) -> Self {
        self.max_covid = max;
        self
    }

    /// Resets the capacity limits to a named track's presets.
    pub fn apply_track(&mut self, track: CensusTrack) {
        match track {
            CensusTrack::Default => {
                self.max_total = DEFAULT_MAX_CENSUS;
                self.max_ccu = DEFAULT_MAX_CENSUS;
                self.max_covid = DEFAULT_MAX_CENSUS;
            }
            CensusTrack::Teaching | CensusTrack::Orienting => {
                self.max_total = 12;
                self.max_ccu = 12;
                self.max_covid = 12;
            }
            CensusTrack::CovidFree => {
                self.max_covid = 0;
            }
        }
    }
}

/// Named capacity presets applied to a provider profile.
///
/// `CovidFree` only zeroes the COVID limit; the other tracks reset all
/// three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CensusTrack {
    Default,
    Teaching,
    Orienting,
    CovidFree,
}

impl CensusTrack {
    /// Parses the track name used by profile-edit surfaces. Unknown
    /// names return `None`, leaving the profile untouched.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(CensusTrack::Default),
            "teaching" => Some(CensusTrack::Teaching),
            "orienting" => Some(CensusTrack::Orienting),
            "COVID-free" => Some(CensusTrack::CovidFree),
            _ => None,
        }
    }
}

/// Distribution role carried by a roster slot.
///
/// Only slots holding a `Rounder` role take part in allocation.
/// `Secondary` marks staff scheduled on the day in a non-rounding
/// capacity (triage, risk, admin), listed but never assigned patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// A rounding slot. The sort key seeds the initial batting order.
    Rounder { sort_key: i32 },
    /// A non-rounding assignment for the day.
    Secondary,
}

impl Role {
    /// Classifies a feed task name into a role.
    ///
    /// The letters of the name are uppercased and everything else is
    /// stripped; a name starting with `DOC` is a rounder whose sort
    /// key is the integer formed by the name's digit characters, zero
    /// when there are none. Any other task is secondary.
    pub fn classify(task_name: &str) -> Self {
        let letters: String = task_name
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_uppercase();
        if letters.starts_with("DOC") {
            let digits: String = task_name.chars().filter(|c| c.is_ascii_digit()).collect();
            Role::Rounder {
                sort_key: digits.parse().unwrap_or(0),
            }
        } else {
            Role::Secondary
        }
    }

    pub fn is_rounder(&self) -> bool {
        matches!(self, Role::Rounder { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_provider_gets_default_limits() {
        let provider = Provider::new("provA");
        assert_eq!(provider.display_name, "provA");
        assert_eq!(provider.max_total, 17);
        assert_eq!(provider.max_ccu, 17);
        assert_eq!(provider.max_covid, 17);
    }

    #[test]
    fn test_builder_overrides_limits() {
        let provider = Provider::new("provB")
            .with_display_name("Dr. B")
            .with_max_total(19)
            .with_max_ccu(14)
            .with_max_covid(3);
        assert_eq!(provider.display_name, "Dr. B");
        assert_eq!(provider.max_total, 19);
        assert_eq!(provider.max_ccu, 14);
        assert_eq!(provider.max_covid, 3);
    }

    #[test]
    fn test_teaching_track_caps_at_twelve() {
        let mut provider = Provider::new("provC");
        provider.apply_track(CensusTrack::Teaching);
        assert_eq!(provider.max_total, 12);
        assert_eq!(provider.max_ccu, 12);
        assert_eq!(provider.max_covid, 12);
    }

    #[test]
    fn test_covid_free_track_only_zeroes_covid() {
        let mut provider = Provider::new("provD").with_max_total(19);
        provider.apply_track(CensusTrack::CovidFree);
        assert_eq!(provider.max_total, 19);
        assert_eq!(provider.max_ccu, 17);
        assert_eq!(provider.max_covid, 0);
    }

    #[test]
    fn test_track_names() {
        assert_eq!(CensusTrack::from_name("default"), Some(CensusTrack::Default));
        assert_eq!(CensusTrack::from_name("orienting"), Some(CensusTrack::Orienting));
        assert_eq!(CensusTrack::from_name("COVID-free"), Some(CensusTrack::CovidFree));
        assert_eq!(CensusTrack::from_name("covid-free"), None);
        assert_eq!(CensusTrack::from_name("nights"), None);
    }

    #[test]
    fn test_classify_rounder_tasks() {
        assert_eq!(Role::classify("DOC 3"), Role::Rounder { sort_key: 3 });
        assert_eq!(Role::classify("Doc 12"), Role::Rounder { sort_key: 12 });
        assert_eq!(Role::classify("doc"), Role::Rounder { sort_key: 0 });
    }

    #[test]
    fn test_classify_secondary_tasks() {
        assert_eq!(Role::classify("RISK1"), Role::Secondary);
        assert_eq!(Role::classify("PTO/Vacation1"), Role::Secondary);
        assert_eq!(Role::classify("PM Triage"), Role::Secondary);
        assert_eq!(Role::classify(""), Role::Secondary);
    }
}
