// src/lib.rs
//! Occupational safety metrics engine.
//!
//! Pure, single-threaded computation over already-fetched collections:
//! rosters, absence/medical-leave cases, accident reports, training
//! sessions and audit findings go in; period-scoped KPIs (frequency,
//! severity, incidence, accidentability, absenteeism, training
//! compliance, classification tallies) come out.
//!
//! Every entry point takes `now` as an explicit parameter and is a
//! deterministic function of its inputs. Malformed input never raises:
//! unparseable dates, missing fields and unknown free-text categories
//! degrade to documented defaults.

pub mod absence;
pub mod accidents;
pub mod breakdown;
pub mod classification;
pub mod health;
pub mod indices;
pub mod model;
pub mod period;
pub mod report;
pub mod training;
pub mod workforce;

#[cfg(test)]
mod health_tests;
#[cfg(test)]
mod indices_tests;

pub type EmployeeId = String;
pub type BranchId = String;

pub use model::{Lookups, SafetyDataSet};
pub use period::AnalysisPeriod;
pub use report::{MetricsEngine, SafetyReport, YearComparison};
