//! Subscription revenue bridge and retention analytics for a membership venue.
//!
//! Pure, deterministic calculators over two monthly member snapshots:
//!   1. `bridge`    — MRR bridge (new, expansion, contraction, churn, pause)
//!   2. `counts`    — active, new, churned and paused head counts
//!   3. `retention` — NRR, GRR, logo and revenue churn
//!   4. `attach`    — attach rate and all-in ARPM
//!
//! `summary` composes them per month transition and over a series, and
//! `alerts` checks a summary against configured thresholds. Nothing in this
//! crate touches a database, the network, or the clock.

pub mod alerts;
pub mod attach;
pub mod bridge;
pub mod calendar;
pub mod config;
pub mod counts;
pub mod error;
pub mod retention;
pub mod snapshot;
pub mod summary;
pub mod types;
