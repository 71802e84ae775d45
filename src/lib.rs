//! Census-balanced patient distribution for hospitalist rounding teams.
//!
//! Each morning a rounding service starts from yesterday's censuses and
//! a list of newly admitted patients. This crate models that day and
//! distributes the new patients across the rounders so that total, CCU,
//! and COVID loads stay level while bounce-backs return to their prior
//! physician and not-yet-seen admissions park safely for the next day.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Provider`, `Patient`, `RounderSlot`,
//!   `Roster`, `CensusBoard`, plus roles and census tracks
//! - **`engine`**: The distribution passes, slot-selection primitives,
//!   and the day report
//! - **`ingest`**: Staffing-feed rows, snapshot caching, the provider
//!   directory, and roster construction
//! - **`validation`**: Input integrity checks (blank censuses, limits
//!   out of range, batting-order gaps, duplicates)
//! - **`error`**: Run-stopping and feed failures
//!
//! # Architecture
//!
//! The crate is transport-free. Callers implement `ingest::FeedSource`
//! for their upstream schedule export, build a `Roster`, enter starting
//! censuses and patients, and hand the roster to `engine::Distributor`.
//! Every pass reads and writes the roster in place, so reruns after an
//! edit start from a clean reset rather than accumulating state.

pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod validation;

pub use engine::{DayReport, DistributionSummary, Distributor};
pub use error::{DistributionError, FeedError};
