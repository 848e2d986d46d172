//! Connectivity tracking.
//!
//! The platform reports whether the network is reachable; this module keeps
//! that report as the single source of truth and fans transitions out to
//! subscribers such as the reconnect listener.

mod monitor;

pub use monitor::{ConnectivityMonitor, Subscription};
