//! Connectivity estimator state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use pwa_core::Fetcher;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    default_endpoints, probe, CandidateEndpoint, ConnectivityState, ConnectivityStatus,
    NetworkQuality, StatusReason,
};

/// Settle delay after a browser online event: the event fires before the
/// link is actually usable.
pub const DEFAULT_ONLINE_SETTLE: Duration = Duration::from_secs(1);
/// Settle delay after a network-information change event, to avoid probing
/// during link renegotiation.
pub const DEFAULT_CHANGE_SETTLE: Duration = Duration::from_secs(2);
/// Interval between periodic re-checks.
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Page visibility as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Browser signal collaborator: the online flag, page visibility, and the
/// optional network-information sample.
///
/// The negative online flag is trusted (the interface really is down); the
/// positive flag is not, which is why the estimator probes at all.
pub trait BrowserSignals: Send + Sync {
    /// Browser-reported online flag.
    fn is_online(&self) -> bool;

    /// Current page visibility.
    fn visibility(&self) -> Visibility;

    /// Network-quality sample, if the browser exposes one.
    fn network_quality(&self) -> Option<NetworkQuality> {
        None
    }
}

/// Subscriber event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Fired on the transition to usable connectivity.
    Online,
    /// Fired on the transition away from usable connectivity.
    Offline,
    /// Fired on every completed determination.
    Change,
}

/// Handle returned by `subscribe`, used to remove the callback again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type StatusCallback = Arc<dyn Fn(&ConnectivityStatus, StatusReason) + Send + Sync>;

struct Subscriber {
    id: u64,
    kind: EventKind,
    callback: StatusCallback,
}

/// Estimates whether the device currently has usable internet access.
///
/// Runs the full-check algorithm over an ordered candidate endpoint list,
/// debounces browser events with settle delays, re-checks periodically while
/// the page is visible, and notifies subscribers on status determinations.
/// No operation here fails past its boundary: probe failures become status
/// transitions.
pub struct ConnectivityEstimator<F: Fetcher, B: BrowserSignals> {
    fetcher: Arc<F>,
    signals: Arc<B>,
    endpoints: Vec<CandidateEndpoint>,
    online_settle: Duration,
    change_settle: Duration,
    check_interval: Duration,
    status: Mutex<ConnectivityStatus>,
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    periodic: Mutex<Option<JoinHandle<()>>>,
}

impl<F, B> ConnectivityEstimator<F, B>
where
    F: Fetcher + 'static,
    B: BrowserSignals + 'static,
{
    /// Create an estimator with the default candidate list and delays.
    pub fn new(fetcher: Arc<F>, signals: Arc<B>) -> Self {
        Self {
            fetcher,
            signals,
            endpoints: default_endpoints(),
            online_settle: DEFAULT_ONLINE_SETTLE,
            change_settle: DEFAULT_CHANGE_SETTLE,
            check_interval: DEFAULT_CHECK_INTERVAL,
            status: Mutex::new(ConnectivityStatus::unknown()),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            periodic: Mutex::new(None),
        }
    }

    /// Replace the candidate endpoint list.
    pub fn with_endpoints(mut self, endpoints: Vec<CandidateEndpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Override the periodic check interval.
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    /// Override the post-event settle delays.
    pub fn with_settle_delays(mut self, online: Duration, change: Duration) -> Self {
        self.online_settle = online;
        self.change_settle = change;
        self
    }

    /// Initial determination: trust a negative browser flag immediately,
    /// otherwise run a full check.
    pub async fn init(&self) {
        if !self.signals.is_online() {
            self.update_status(ConnectivityState::Offline, StatusReason::Offline);
        } else {
            self.check_connectivity().await;
        }
    }

    /// Run the full-check algorithm. Returns whether the device is online.
    ///
    /// A negative browser flag short-circuits to `Offline` without probing.
    /// Otherwise candidates are probed in order; the first reachable one
    /// settles `Online`, and exhausting the list settles `Limited`.
    pub async fn check_connectivity(&self) -> bool {
        self.full_check(None).await
    }

    /// Re-run the determination on demand.
    pub async fn force_check(&self) -> bool {
        self.check_connectivity().await
    }

    async fn full_check(&self, reason_hint: Option<StatusReason>) -> bool {
        if !self.signals.is_online() {
            self.update_status(
                ConnectivityState::Offline,
                reason_hint.unwrap_or(StatusReason::Offline),
            );
            return false;
        }

        for endpoint in &self.endpoints {
            if probe(self.fetcher.as_ref(), endpoint).await.is_reachable() {
                self.update_status(
                    ConnectivityState::Online,
                    reason_hint.unwrap_or(StatusReason::Online),
                );
                return true;
            }
        }

        // Browser claims connectivity but nothing answered: captive portal
        // or DNS failure pattern.
        self.update_status(
            ConnectivityState::Limited,
            reason_hint.unwrap_or(StatusReason::Limited),
        );
        false
    }

    /// Browser "online" event: wait for the link to settle, then verify.
    pub async fn handle_online_event(&self) {
        debug!("Browser online event, settling before check");
        tokio::time::sleep(self.online_settle).await;
        self.check_connectivity().await;
    }

    /// Browser "offline" event: the negative signal is reliable, so settle
    /// `Offline` immediately without probing.
    pub fn handle_offline_event(&self) {
        debug!("Browser offline event");
        self.update_status(ConnectivityState::Offline, StatusReason::Offline);
    }

    /// Network-information "change" event: longer settle, then verify.
    pub async fn handle_network_change(&self) {
        debug!("Network conditions changed, settling before check");
        tokio::time::sleep(self.change_settle).await;
        self.full_check(Some(StatusReason::NetworkChanged)).await;
    }

    /// Page visibility change: re-check immediately when the page becomes
    /// visible while believed online.
    pub async fn handle_visibility_change(&self) {
        if self.signals.visibility() == Visibility::Visible && self.status().is_online() {
            self.check_connectivity().await;
        }
    }

    /// Start the periodic re-check task.
    ///
    /// Checks run every `check_interval` but only while the page is visible;
    /// background tabs are skipped. A previous task is replaced.
    pub fn start(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let interval_duration = self.check_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval_duration);
            // The first tick of a tokio interval fires immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(estimator) = weak.upgrade() else { break };
                if estimator.signals.visibility() == Visibility::Visible {
                    estimator.check_connectivity().await;
                }
            }
        });

        if let Some(previous) = self.periodic.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// Cancel the periodic re-check task.
    pub fn stop(&self) {
        if let Some(handle) = self.periodic.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Last-known status snapshot.
    pub fn status(&self) -> ConnectivityStatus {
        self.status.lock().unwrap().clone()
    }

    /// Register a callback for an event kind.
    pub fn subscribe(
        &self,
        kind: EventKind,
        callback: impl Fn(&ConnectivityStatus, StatusReason) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().unwrap().push(Subscriber {
            id,
            kind,
            callback: Arc::new(callback),
        });
        SubscriptionId(id)
    }

    /// Remove a previously registered callback. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock().unwrap();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id.0);
        subscribers.len() != before
    }

    fn update_status(&self, state: ConnectivityState, reason: StatusReason) {
        let (snapshot, was_online) = {
            let mut status = self.status.lock().unwrap();
            let was_online = status.state == ConnectivityState::Online;
            status.state = state;
            status.last_check = Some(SystemTime::now());
            status.quality = self.signals.network_quality();
            (status.clone(), was_online)
        };

        info!(state = %state, reason = ?reason, "Connectivity determination");

        let is_online = state == ConnectivityState::Online;
        // Snapshot the matching callbacks, then invoke with the lock
        // released: a callback is allowed to subscribe or unsubscribe on
        // this estimator.
        let to_notify: Vec<StatusCallback> = {
            let subscribers = self.subscribers.lock().unwrap();
            subscribers
                .iter()
                .filter(|subscriber| match subscriber.kind {
                    EventKind::Online => is_online && !was_online,
                    EventKind::Offline => !is_online && was_online,
                    EventKind::Change => true,
                })
                .map(|subscriber| Arc::clone(&subscriber.callback))
                .collect()
        };
        for callback in to_notify {
            callback(&snapshot, reason);
        }
    }
}

impl<F: Fetcher, B: BrowserSignals> Drop for ConnectivityEstimator<F, B> {
    fn drop(&mut self) {
        if let Some(handle) = self.periodic.lock().unwrap().take() {
            handle.abort();
        }
    }
}
