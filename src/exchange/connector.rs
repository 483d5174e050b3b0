//! The exchange connector contract.
//!
//! One connector instance per exchange integration, owned by the router that
//! created it. The trait bundles four concerns:
//!
//! 1. lifecycle (`configure` → `start` → `shutdown`) and the owner's control
//!    surface (enable window, accept-probability throttle);
//! 2. auction injection back into the router through the callbacks handed to
//!    `start`;
//! 3. campaign/creative compatibility, computed once per configuration
//!    change;
//! 4. the staged per-request filter pipeline.
//!
//! Defaults implement the base policy: every campaign and creative is
//! compatible and every filter passes. A concrete exchange overrides only
//! what its wire format restricts.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::domain::{Auction, BidRequest, CampaignConfig, Creative};
use crate::error::{ConfigError, Result};

use super::compatibility::{CampaignCompatibility, ExchangeCompatibility, SharedInfo};
use super::control::{AuctionCallbacks, ConnectorControl};

/// Adapter between one external exchange and the owning router.
///
/// # Example
///
/// ```ignore
/// struct AcmeConnector {
///     control: ConnectorControl,
/// }
///
/// #[async_trait]
/// impl ExchangeConnector for AcmeConnector {
///     fn exchange_name(&self) -> &'static str {
///         "acme"
///     }
///
///     fn control(&self) -> &ConnectorControl {
///         &self.control
///     }
///
///     fn configure(&mut self, parameters: &Value) -> Result<(), ConfigError> {
///         // validate acme-specific parameters
///         Ok(())
///     }
/// }
/// ```
impl std::fmt::Debug for dyn ExchangeConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeConnector")
            .field("exchange_name", &self.exchange_name())
            .field("instance_name", &self.instance_name())
            .finish()
    }
}

#[async_trait]
pub trait ExchangeConnector: Send + Sync {
    /// Canonical exchange identifier.
    ///
    /// Shares a namespace with the registry key the connector was created
    /// under.
    fn exchange_name(&self) -> &'static str;

    /// The embedded control state backing the default lifecycle methods.
    fn control(&self) -> &ConnectorControl;

    /// Apply exchange-specific configuration.
    ///
    /// The document is interpreted entirely by the exchange. A malformed
    /// document fails this connector's startup and nothing else.
    fn configure(&mut self, parameters: &Value) -> std::result::Result<(), ConfigError>;

    /// Human-readable instance name, assigned at creation.
    fn instance_name(&self) -> &str {
        self.control().name()
    }

    /// Install the router's callbacks and begin operating.
    ///
    /// Overrides open transport resources, then delegate here.
    async fn start(&self, callbacks: AuctionCallbacks) -> Result<()> {
        self.control().activate(callbacks);
        Ok(())
    }

    /// Stop admitting opportunities and release transport resources.
    ///
    /// Idempotent, callable without a prior `start`, and safe from any
    /// thread. In-flight auctions follow the control state's
    /// [`ShutdownPolicy`](super::control::ShutdownPolicy).
    async fn shutdown(&self) -> Result<()> {
        self.control().stop();
        Ok(())
    }

    /// Refresh the deadline after which no new opportunities are admitted.
    ///
    /// The owner pushes this forward periodically; a connector whose
    /// controller dies goes quiet on its own once the deadline passes.
    fn enable_until(&self, deadline: DateTime<Utc>) {
        self.control().set_enabled_until(deadline);
    }

    /// Set the fraction of bid requests this connector accepts, in [0, 1].
    fn set_accept_bid_request_probability(
        &self,
        probability: f64,
    ) -> std::result::Result<(), ConfigError> {
        self.control().set_accept_probability(probability)
    }

    /// Decide whether a campaign, and each of its creatives, can be served
    /// on this exchange.
    ///
    /// Called when a campaign's configuration changes, never per bid
    /// request; callers cache the result. When `include_reasons` is false
    /// the result carries no reason strings, sparing allocations on the
    /// configuration path for exchanges with thousands of campaigns.
    fn campaign_compatibility(
        &self,
        config: &CampaignConfig,
        include_reasons: bool,
    ) -> CampaignCompatibility {
        let creatives = config
            .creatives()
            .iter()
            .map(|creative| self.creative_compatibility(creative, include_reasons))
            .collect();
        CampaignCompatibility::new(ExchangeCompatibility::compatible(), creatives)
    }

    /// Decide whether a single creative can be served on this exchange.
    fn creative_compatibility(
        &self,
        _creative: &Creative,
        _include_reasons: bool,
    ) -> ExchangeCompatibility {
        ExchangeCompatibility::compatible()
    }

    /// Cheap per-request filter, run against the full opportunity stream.
    ///
    /// `info` is the payload cached by the compatibility check for this
    /// campaign; treat it as immutable.
    fn bid_request_pre_filter(
        &self,
        _request: &BidRequest,
        _config: &CampaignConfig,
        _info: Option<&SharedInfo>,
    ) -> bool {
        true
    }

    /// Possibly expensive filter, run only on requests that passed the
    /// pre-filter and the router's generic filtering stages.
    fn bid_request_post_filter(
        &self,
        _request: &BidRequest,
        _config: &CampaignConfig,
        _info: Option<&SharedInfo>,
    ) -> bool {
        true
    }

    /// Per-creative filter for an already-eligible campaign.
    ///
    /// `info` is the creative's cached compatibility payload.
    fn bid_request_creative_filter(
        &self,
        _request: &BidRequest,
        _config: &CampaignConfig,
        _info: Option<&SharedInfo>,
    ) -> bool {
        true
    }

    /// Whether a campaign may bid on this request: pre-filter and
    /// post-filter must both pass.
    ///
    /// A filter that panics counts as a rejection; one malformed opportunity
    /// must not take down the admission stream.
    fn eligible_for(
        &self,
        request: &BidRequest,
        config: &CampaignConfig,
        compatibility: &CampaignCompatibility,
    ) -> bool {
        if !compatibility.is_compatible() {
            return false;
        }
        let info = compatibility.campaign().info();
        let verdict = catch_unwind(AssertUnwindSafe(|| {
            self.bid_request_pre_filter(request, config, info)
                && self.bid_request_post_filter(request, config, info)
        }));
        match verdict {
            Ok(passed) => passed,
            Err(_) => {
                warn!(
                    exchange = self.exchange_name(),
                    request = request.id(),
                    campaign = config.id(),
                    "filter panicked; rejecting request"
                );
                false
            }
        }
    }

    /// Indices of the creatives that may fill this request.
    ///
    /// Empty when the campaign itself is ineligible. Indices align with the
    /// campaign's creative list.
    fn eligible_creatives(
        &self,
        request: &BidRequest,
        config: &CampaignConfig,
        compatibility: &CampaignCompatibility,
    ) -> Vec<usize> {
        if !self.eligible_for(request, config, compatibility) {
            return Vec::new();
        }
        compatibility
            .creatives()
            .iter()
            .enumerate()
            .filter(|(_, creative)| {
                creative.is_compatible()
                    && catch_unwind(AssertUnwindSafe(|| {
                        self.bid_request_creative_filter(request, config, creative.info())
                    }))
                    .unwrap_or_else(|_| {
                        warn!(
                            exchange = self.exchange_name(),
                            request = request.id(),
                            campaign = config.id(),
                            "creative filter panicked; rejecting creative"
                        );
                        false
                    })
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// Run the admission gate for one received opportunity and, if it
    /// passes, create the auction and hand it to the router.
    ///
    /// Returns `None` when the gate (enable window or sampling) declined the
    /// request. Concrete transports call this once per decoded opportunity.
    fn admit_bid_request(&self, request: BidRequest) -> Result<Option<Arc<Auction>>> {
        if !self.control().should_accept(Utc::now()) {
            return Ok(None);
        }
        let auction = Arc::new(Auction::new(self.exchange_name(), request));
        self.control().submit_auction(auction.clone())?;
        Ok(Some(auction))
    }
}
