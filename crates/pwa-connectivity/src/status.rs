//! Connectivity status snapshot types.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Estimated connectivity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// No determination has been made yet.
    Unknown,
    /// At least one probe endpoint is reachable.
    Online,
    /// The browser reports the interface as down.
    Offline,
    /// The browser claims connectivity but no endpoint is reachable
    /// (captive portal or DNS failure pattern).
    Limited,
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Online => write!(f, "ONLINE"),
            Self::Offline => write!(f, "OFFLINE"),
            Self::Limited => write!(f, "LIMITED"),
        }
    }
}

/// Why the estimator settled on its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusReason {
    Online,
    Offline,
    Limited,
    NetworkChanged,
}

/// Network-quality sample from the browser's network information API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkQuality {
    /// Effective connection type ("4g", "3g", ...).
    pub effective_type: String,
    /// Downlink bandwidth estimate in Mbps.
    pub downlink_mbps: f64,
    /// Round-trip time estimate in milliseconds.
    pub rtt_ms: u64,
    /// Whether the user enabled data saver.
    pub save_data: bool,
}

/// Last-known connectivity determination.
///
/// Created at estimator init, mutated only by the estimator's update routine,
/// read by any subscriber at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityStatus {
    /// Estimated state.
    pub state: ConnectivityState,
    /// When the determination was made.
    pub last_check: Option<SystemTime>,
    /// Network-quality sample, when the browser exposes one.
    pub quality: Option<NetworkQuality>,
}

impl ConnectivityStatus {
    /// Status before any determination.
    pub fn unknown() -> Self {
        Self {
            state: ConnectivityState::Unknown,
            last_check: None,
            quality: None,
        }
    }

    /// Whether the device is believed to have usable internet access.
    pub fn is_online(&self) -> bool {
        self.state == ConnectivityState::Online
    }
}

impl Default for ConnectivityStatus {
    fn default() -> Self {
        Self::unknown()
    }
}
