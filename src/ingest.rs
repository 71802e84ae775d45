//! Staffing-feed ingestion.
//!
//! The upstream scheduling system exports who works on a given day and
//! what task each person holds. This module owns the shape of that
//! payload, a per-date snapshot cache with a staleness window, the
//! persistent provider directory, and the construction of a day's
//! roster from feed records.
//!
//! Transport is deliberately out of scope: a [`FeedSource`]
//! implementation owns HTTP and authentication, and everything here
//! consumes decoded rows.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FeedError;
use crate::models::{Provider, Role, Roster};

/// How long a cached snapshot serves before the next read refetches.
pub const DEFAULT_MAX_AGE_MINUTES: i64 = 60;

/// One row of the upstream schedule payload, upstream field names and
/// all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawFeedRow {
    pub staff_abbrev: String,
    pub task_name: String,
    /// Struck rows are cancellations still present in the export.
    pub is_struck: bool,
}

/// A staffing record retained after filtering: who holds which task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub staff_abbrev: String,
    pub task_name: String,
}

/// Drops struck rows and strips each survivor to its staffing fields.
pub fn relevant_records(rows: &[RawFeedRow]) -> Vec<FeedRecord> {
    rows.iter()
        .filter(|row| !row.is_struck)
        .map(|row| FeedRecord {
            staff_abbrev: row.staff_abbrev.clone(),
            task_name: row.task_name.clone(),
        })
        .collect()
}

/// Source of raw feed rows for a date.
pub trait FeedSource {
    fn fetch(&self, date: NaiveDate) -> Result<Vec<RawFeedRow>, FeedError>;
}

/// A cached feed snapshot for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub date: NaiveDate,
    pub fetched_at: DateTime<Utc>,
    pub records: Vec<FeedRecord>,
}

/// Per-date snapshot cache.
///
/// The clock is always passed in by the caller, which keeps refresh
/// decisions reproducible.
#[derive(Debug, Clone, Default)]
pub struct FeedCache {
    snapshots: HashMap<NaiveDate, FeedSnapshot>,
}

impl FeedCache {
    pub fn new() -> Self {
        FeedCache::default()
    }

    /// The cached snapshot for the date, fresh or not.
    pub fn cached(&self, date: NaiveDate) -> Option<&FeedSnapshot> {
        self.snapshots.get(&date)
    }

    /// Serves the cached snapshot while it is younger than `max_age`,
    /// otherwise fetches, filters, stores, and returns a new one. A
    /// snapshot exactly `max_age` old already counts as stale.
    pub fn get_or_refresh(
        &mut self,
        date: NaiveDate,
        now: DateTime<Utc>,
        max_age: Duration,
        source: &dyn FeedSource,
    ) -> Result<FeedSnapshot, FeedError> {
        if let Some(snapshot) = self.snapshots.get(&date) {
            if now - snapshot.fetched_at < max_age {
                debug!(%date, "feed snapshot served from cache");
                return Ok(snapshot.clone());
            }
        }
        let rows = source.fetch(date)?;
        let snapshot = FeedSnapshot {
            date,
            fetched_at: now,
            records: relevant_records(&rows),
        };
        info!(%date, rows = rows.len(), kept = snapshot.records.len(), "feed snapshot refreshed");
        self.snapshots.insert(date, snapshot.clone());
        Ok(snapshot)
    }

    /// Discards any cached snapshot for the date and fetches a new
    /// one regardless of age.
    pub fn force_refresh(
        &mut self,
        date: NaiveDate,
        now: DateTime<Utc>,
        source: &dyn FeedSource,
    ) -> Result<FeedSnapshot, FeedError> {
        self.invalidate(date);
        self.get_or_refresh(date, now, Duration::zero(), source)
    }

    /// Drops any cached snapshot for the date, forcing the next
    /// [`get_or_refresh`](Self::get_or_refresh) to fetch.
    pub fn invalidate(&mut self, date: NaiveDate) {
        self.snapshots.remove(&date);
    }
}

/// Persistent provider profiles keyed by staff abbreviation.
///
/// Profiles outlive any single day, so capacity overrides set once
/// keep applying to every roster built afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDirectory {
    providers: HashMap<String, Provider>,
}

impl ProviderDirectory {
    pub fn new() -> Self {
        ProviderDirectory::default()
    }

    /// The profile for the abbreviation, created with default limits
    /// on first sight.
    pub fn get_or_create(&mut self, abbrev: &str) -> Provider {
        self.providers
            .entry(abbrev.to_string())
            .or_insert_with(|| Provider::new(abbrev))
            .clone()
    }

    /// Inserts or replaces a profile, keyed by its id.
    pub fn upsert(&mut self, provider: Provider) {
        self.providers.insert(provider.id.clone(), provider);
    }

    pub fn get(&self, abbrev: &str) -> Option<&Provider> {
        self.providers.get(abbrev)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

/// Builds a day's roster from feed records.
///
/// Every record's provider gets a slot (created on first sight, one
/// per provider) and the record's task classifies into the slot's
/// role. Once all records are applied the batting order is numbered
/// from the rounder sort keys. Starting censuses stay blank for
/// hand entry.
pub fn build_roster(
    date: NaiveDate,
    records: &[FeedRecord],
    directory: &mut ProviderDirectory,
) -> Roster {
    let mut roster = Roster::new(date);
    for record in records {
        let provider = directory.get_or_create(&record.staff_abbrev);
        let idx = roster.ensure_slot(provider);
        roster.assign_role_at(idx, Role::classify(&record.task_name));
    }
    roster.init_batting_order();
    info!(
        %date,
        providers = roster.slots.len(),
        rounders = roster.rounder_count(),
        "roster built from feed"
    );
    roster
}
