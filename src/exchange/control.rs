//! Shared connector control state.
//!
//! Every connector embeds a [`ConnectorControl`]: the enable-until deadline
//! and accept-probability throttle written by the owning router's control
//! loop, the callback slots installed at start, and the in-flight auction
//! table. Control-plane writes are single atomic stores and data-plane reads
//! are single atomic loads, so a filter or admission decision can observe a
//! stale value for one propagation but never a torn one.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use rand::Rng;
use tracing::{debug, info, trace, warn};

use crate::domain::{Auction, AuctionId, AuctionOutcome};
use crate::error::{ConfigError, ConnectorError};

/// Callback invoked with a shared auction reference.
pub type OnAuction = Arc<dyn Fn(Arc<Auction>) + Send + Sync>;

/// The router's two callback slots, handed to a connector at start.
///
/// Requiring them at `start` removes any window where a running connector
/// could admit an auction with nowhere to send it.
#[derive(Clone)]
pub struct AuctionCallbacks {
    on_new_auction: OnAuction,
    on_auction_done: OnAuction,
}

impl AuctionCallbacks {
    /// Build the callback pair from two closures.
    pub fn new(
        on_new_auction: impl Fn(Arc<Auction>) + Send + Sync + 'static,
        on_auction_done: impl Fn(Arc<Auction>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_new_auction: Arc::new(on_new_auction),
            on_auction_done: Arc::new(on_auction_done),
        }
    }
}

impl std::fmt::Debug for AuctionCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuctionCallbacks").finish_non_exhaustive()
    }
}

/// What `shutdown` does with auctions that have not resolved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownPolicy {
    /// Leave in-flight auctions to finish through their normal outcome path.
    #[default]
    Drain,
    /// Complete every in-flight auction with [`AuctionOutcome::Cancelled`].
    CancelInFlight,
}

/// Control-plane state shared between a connector's transport and its owner.
pub struct ConnectorControl {
    name: String,
    /// Epoch milliseconds; zero or negative means never enabled.
    enabled_until_ms: AtomicI64,
    /// Bit pattern of the accept probability in [0, 1].
    accept_probability_bits: AtomicU64,
    running: AtomicBool,
    callbacks: RwLock<Option<AuctionCallbacks>>,
    in_flight: DashMap<AuctionId, Arc<Auction>>,
    shutdown_policy: ShutdownPolicy,
}

impl ConnectorControl {
    /// Create control state for a named connector instance.
    ///
    /// Starts disabled: not running, no deadline, accept probability 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled_until_ms: AtomicI64::new(0),
            accept_probability_bits: AtomicU64::new(1.0f64.to_bits()),
            running: AtomicBool::new(false),
            callbacks: RwLock::new(None),
            in_flight: DashMap::new(),
            shutdown_policy: ShutdownPolicy::default(),
        }
    }

    /// Override the shutdown drain policy.
    #[must_use]
    pub fn with_shutdown_policy(mut self, policy: ShutdownPolicy) -> Self {
        self.shutdown_policy = policy;
        self
    }

    /// Human-readable instance name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured shutdown drain policy.
    #[must_use]
    pub fn shutdown_policy(&self) -> ShutdownPolicy {
        self.shutdown_policy
    }

    /// Whether the connector has been started and not yet shut down.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Install callbacks and mark the connector running.
    pub fn activate(&self, callbacks: AuctionCallbacks) {
        *self.callbacks.write() = Some(callbacks);
        self.running.store(true, Ordering::Release);
        info!(connector = %self.name, "connector running");
    }

    /// Push the enable deadline forward.
    ///
    /// The owner calls this periodically as a heartbeat; once it stops, the
    /// connector autonomously stops admitting when the deadline passes.
    pub fn set_enabled_until(&self, deadline: DateTime<Utc>) {
        self.enabled_until_ms
            .store(deadline.timestamp_millis(), Ordering::Release);
        trace!(connector = %self.name, %deadline, "enable window updated");
    }

    /// The current enable deadline, if one was ever set.
    #[must_use]
    pub fn enabled_until(&self) -> Option<DateTime<Utc>> {
        let millis = self.enabled_until_ms.load(Ordering::Acquire);
        if millis <= 0 {
            return None;
        }
        DateTime::from_timestamp_millis(millis)
    }

    /// Set the fraction of bid requests to accept, in [0, 1].
    pub fn set_accept_probability(&self, probability: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::InvalidValue {
                field: "accept_probability",
                reason: format!("{probability} is outside [0, 1]"),
            });
        }
        self.accept_probability_bits
            .store(probability.to_bits(), Ordering::Release);
        debug!(connector = %self.name, probability, "accept probability updated");
        Ok(())
    }

    /// The current accept probability.
    #[must_use]
    pub fn accept_probability(&self) -> f64 {
        f64::from_bits(self.accept_probability_bits.load(Ordering::Acquire))
    }

    /// Whether new opportunities may be admitted at `now`, ignoring sampling.
    ///
    /// True iff the connector is running and the enable deadline has not
    /// passed. A connector whose owner stopped refreshing the deadline goes
    /// quiet here without any shutdown call.
    #[must_use]
    pub fn accepting(&self, now: DateTime<Utc>) -> bool {
        if !self.is_running() {
            return false;
        }
        let deadline = self.enabled_until_ms.load(Ordering::Acquire);
        deadline > 0 && now.timestamp_millis() <= deadline
    }

    /// The full admission gate: enable window plus a Bernoulli draw against
    /// the accept probability.
    #[must_use]
    pub fn should_accept(&self, now: DateTime<Utc>) -> bool {
        if !self.accepting(now) {
            return false;
        }
        let probability = self.accept_probability();
        if probability >= 1.0 {
            return true;
        }
        if probability <= 0.0 {
            return false;
        }
        rand::thread_rng().gen::<f64>() < probability
    }

    /// Hand a newly admitted auction to the router, exactly once.
    ///
    /// Fails if the connector is not running or the auction was already
    /// submitted; the losing caller gets an error instead of the router
    /// seeing a second `on_new_auction`.
    pub fn submit_auction(&self, auction: Arc<Auction>) -> Result<(), ConnectorError> {
        if !self.is_running() {
            return Err(ConnectorError::NotRunning);
        }
        let Some(callbacks) = self.callbacks.read().clone() else {
            return Err(ConnectorError::NotRunning);
        };

        auction.mark_submitted()?;
        self.in_flight.insert(auction.id(), auction.clone());
        (callbacks.on_new_auction)(auction);
        Ok(())
    }

    /// Finalize an auction and notify the router, exactly once.
    ///
    /// Allowed while draining after shutdown; the phase tag, not the running
    /// flag, guards the callback.
    pub fn complete_auction(
        &self,
        auction: &Arc<Auction>,
        outcome: AuctionOutcome,
    ) -> Result<(), ConnectorError> {
        auction.mark_completed(outcome)?;
        self.in_flight.remove(&auction.id());

        let callbacks = self.callbacks.read().clone();
        match callbacks {
            Some(callbacks) => (callbacks.on_auction_done)(auction.clone()),
            None => warn!(
                connector = %self.name,
                auction = %auction.id(),
                "auction completed with no callbacks installed"
            ),
        }
        Ok(())
    }

    /// Number of auctions handed to the router and not yet completed.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Stop admissions and apply the shutdown policy. Idempotent.
    ///
    /// Returns the number of in-flight auctions cancelled (zero under
    /// [`ShutdownPolicy::Drain`]).
    pub fn stop(&self) -> usize {
        let was_running = self.running.swap(false, Ordering::AcqRel);

        let mut cancelled = 0;
        if self.shutdown_policy == ShutdownPolicy::CancelInFlight {
            let pending: Vec<Arc<Auction>> = self
                .in_flight
                .iter()
                .map(|entry| entry.value().clone())
                .collect();
            for auction in pending {
                // A concurrent completion may win the race.
                if self
                    .complete_auction(&auction, AuctionOutcome::Cancelled)
                    .is_ok()
                {
                    cancelled += 1;
                }
            }
        }

        if was_running {
            info!(connector = %self.name, cancelled, "connector stopped");
        }
        cancelled
    }
}

impl std::fmt::Debug for ConnectorControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorControl")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .field("enabled_until", &self.enabled_until())
            .field("accept_probability", &self.accept_probability())
            .field("in_flight", &self.in_flight_count())
            .field("shutdown_policy", &self.shutdown_policy)
            .finish_non_exhaustive()
    }
}
