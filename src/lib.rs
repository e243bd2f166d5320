//! Matching of salvaged and new structural steel against cutting demand.
//!
//! A demand set (profile, length, quantity, tolerances) is matched against a
//! stock repository either one line at a time ([`matcher::Matcher`], best
//! score wins) or as a whole batch ([`allocator::Allocator`],
//! first-fit-decreasing per profile, each stock item used at most once).

pub mod allocator;
pub mod candidates;
pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod report;
pub mod repository;
pub mod scoring;
pub mod summary;
pub mod types;

pub use allocator::Allocator;
pub use catalog::ProfileCatalog;
pub use config::{MatchConfig, ScoreWeights, SubstituteTable};
pub use error::{Error, Result};
pub use matcher::Matcher;
pub use repository::{Inventory, SupplyRepository};
pub use summary::EfficiencySummary;
pub use types::{Allocation, CuttingPlan, Demand, MatchOutcome, MatchResult, SupplyItem};
