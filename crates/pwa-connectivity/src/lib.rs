//! Foreground connectivity estimation.
//!
//! The browser's positive online signal is unreliable: a machine can report
//! `online` behind a captive portal or with broken DNS. This crate infers
//! usable reachability by probing an ordered list of endpoints with bounded
//! timeouts, and exposes the result through a subscribe/notify status API.
//!
//! - `probe` / `CandidateEndpoint` - single bounded-time reachability probe
//! - `ConnectivityEstimator` - event-driven state machine over the probes
//! - `ConnectivityStatus` - last-known-value status snapshot

mod estimator;
mod probe;
mod status;

pub use estimator::*;
pub use probe::*;
pub use status::*;
