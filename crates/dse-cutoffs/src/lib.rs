//! Grade-boundary ("cutoff") resolution for the HKDSE study planner.
//!
//! Historical boundary tables are parsed out of loosely formatted markdown
//! documents, merged into a [`cutoffs::CutoffStore`], and queried to turn a
//! percentage score into an estimated exam level.

pub mod attempts;
pub mod config;
pub mod cutoffs;
pub mod error;
pub mod telemetry;
