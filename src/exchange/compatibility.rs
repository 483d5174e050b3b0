//! Campaign and creative compatibility results.
//!
//! Compatibility is computed once per campaign configuration change and
//! cached by the caller; the filter pipeline then reuses the attached `info`
//! payload on every bid request without recomputation. That split is what
//! keeps the per-request path cheap.

use std::any::Any;
use std::sync::Arc;

/// Opaque, exchange-specific payload attached to a compatibility result.
///
/// Written once at creation, then read concurrently by every filter call for
/// that campaign. Exchanges downcast it back to their own type.
pub type SharedInfo = Arc<dyn Any + Send + Sync>;

/// Whether an exchange can serve a campaign or creative.
///
/// `reasons` is populated only when the caller asked for reasons; the hot
/// configuration path for exchanges with thousands of campaigns skips the
/// allocations entirely.
#[derive(Clone, Default)]
pub struct ExchangeCompatibility {
    compatible: bool,
    reasons: Vec<String>,
    info: Option<SharedInfo>,
}

impl ExchangeCompatibility {
    /// A compatible result with no reasons and no cached info.
    #[must_use]
    pub fn compatible() -> Self {
        Self {
            compatible: true,
            reasons: Vec::new(),
            info: None,
        }
    }

    /// An incompatible result carrying one reason when requested.
    #[must_use]
    pub fn incompatible(reason: impl Into<String>, include_reasons: bool) -> Self {
        let mut result = Self::default();
        result.add_reason(reason, include_reasons);
        result
    }

    /// Whether the exchange can serve this campaign or creative.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.compatible
    }

    /// Reasons for incompatibility, if they were requested.
    #[must_use]
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// The cached exchange-specific payload, if any.
    #[must_use]
    pub fn info(&self) -> Option<&SharedInfo> {
        self.info.as_ref()
    }

    /// Downcast the cached payload to a concrete exchange type.
    #[must_use]
    pub fn info_as<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.info.as_ref().and_then(|info| info.downcast_ref::<T>())
    }

    /// Mark compatible, discarding any previously recorded reasons.
    pub fn set_compatible(&mut self) {
        self.compatible = true;
        self.reasons.clear();
    }

    /// Mark incompatible without recording a reason.
    pub fn set_incompatible(&mut self) {
        self.compatible = false;
        self.reasons.clear();
    }

    /// Mark incompatible for the given reason.
    ///
    /// The reason is recorded only when `include_reasons` is set.
    pub fn add_reason(&mut self, reason: impl Into<String>, include_reasons: bool) {
        self.compatible = false;
        if include_reasons {
            self.reasons.push(reason.into());
        }
    }

    /// Attach a cached payload for the filter pipeline to reuse.
    #[must_use]
    pub fn with_info<T: Any + Send + Sync>(mut self, payload: T) -> Self {
        self.info = Some(Arc::new(payload));
        self
    }

    /// Replace the cached payload.
    pub fn set_info(&mut self, info: SharedInfo) {
        self.info = Some(info);
    }
}

impl std::fmt::Debug for ExchangeCompatibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeCompatibility")
            .field("compatible", &self.compatible)
            .field("reasons", &self.reasons)
            .field("info", &self.info.as_ref().map(|_| "..."))
            .finish()
    }
}

/// Compatibility of a campaign and each of its creatives.
///
/// The creative list is index-aligned with the campaign's creative list.
#[derive(Debug, Clone, Default)]
pub struct CampaignCompatibility {
    campaign: ExchangeCompatibility,
    creatives: Vec<ExchangeCompatibility>,
}

impl CampaignCompatibility {
    /// Assemble a campaign result from its parts.
    #[must_use]
    pub fn new(campaign: ExchangeCompatibility, creatives: Vec<ExchangeCompatibility>) -> Self {
        Self {
            campaign,
            creatives,
        }
    }

    /// The campaign-level result.
    #[must_use]
    pub fn campaign(&self) -> &ExchangeCompatibility {
        &self.campaign
    }

    /// Per-creative results, index-aligned with the campaign's creatives.
    #[must_use]
    pub fn creatives(&self) -> &[ExchangeCompatibility] {
        &self.creatives
    }

    /// The result for one creative by configuration index.
    #[must_use]
    pub fn creative(&self, index: usize) -> Option<&ExchangeCompatibility> {
        self.creatives.get(index)
    }

    /// Whether the campaign itself is compatible.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.campaign.is_compatible()
    }
}
