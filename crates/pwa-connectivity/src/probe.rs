//! Single bounded-time reachability probe.

use std::time::Duration;

use pwa_core::{FetchOptions, FetchRequest, Fetcher};
use tracing::debug;

/// A probe target with its per-endpoint timeout budget.
///
/// The candidate list order is the probing priority: fast, cheap endpoints
/// first, local fallbacks last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEndpoint {
    pub url: String,
    pub timeout: Duration,
}

impl CandidateEndpoint {
    /// Create a candidate endpoint.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

/// Default probe candidates: fast external endpoints first, then local
/// resources as fallback.
pub fn default_endpoints() -> Vec<CandidateEndpoint> {
    vec![
        CandidateEndpoint::new(
            "https://www.gstatic.com/generate_204",
            Duration::from_secs(3),
        ),
        CandidateEndpoint::new("https://httpbin.org/status/200", Duration::from_secs(5)),
        CandidateEndpoint::new("https://api.github.com", Duration::from_secs(5)),
        CandidateEndpoint::new("/favicon-32.png", Duration::from_secs(2)),
        CandidateEndpoint::new("/", Duration::from_secs(2)),
    ]
}

/// Outcome of a single probe.
///
/// Cross-origin probes return opaque responses whose status is unreadable,
/// so a real 200 cannot be told apart from an opaque non-error response.
/// That ambiguity is inherent to the technique; `Opaque` is treated as
/// reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The fetch resolved with a readable response.
    Reachable,
    /// The fetch resolved with an opaque cross-origin response.
    Opaque,
    /// The fetch was rejected or timed out.
    Unreachable,
}

impl ProbeOutcome {
    /// Whether the endpoint counts as reachable.
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable | Self::Opaque)
    }
}

/// Probe one endpoint with a hard timeout.
///
/// Issues a HEAD request in no-cors mode, bypassing the HTTP cache. The only
/// available signal is whether the fetch resolved at all. Dropping the
/// timed-out future cancels both the fetch and its timer, on the success and
/// failure paths alike.
pub async fn probe(fetcher: &dyn Fetcher, endpoint: &CandidateEndpoint) -> ProbeOutcome {
    let request = match FetchRequest::head(&endpoint.url) {
        Ok(request) => request,
        Err(e) => {
            debug!(url = %endpoint.url, error = %e, "Probe endpoint URL invalid");
            return ProbeOutcome::Unreachable;
        }
    };

    match tokio::time::timeout(endpoint.timeout, fetcher.fetch(&request, &FetchOptions::probe()))
        .await
    {
        Ok(Ok(response)) if response.is_opaque() => ProbeOutcome::Opaque,
        Ok(Ok(_)) => ProbeOutcome::Reachable,
        Ok(Err(e)) => {
            debug!(url = %endpoint.url, error = %e, "Probe fetch rejected");
            ProbeOutcome::Unreachable
        }
        Err(_) => {
            debug!(url = %endpoint.url, timeout = ?endpoint.timeout, "Probe timed out");
            ProbeOutcome::Unreachable
        }
    }
}
