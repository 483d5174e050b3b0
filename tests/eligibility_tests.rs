//! Integration tests for the staged filter pipeline and the cached
//! compatibility payload.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use bidrelay::domain::{BidRequest, CampaignConfig, Creative};
use bidrelay::error::ConfigError;
use bidrelay::exchange::{
    CampaignCompatibility, ConnectorControl, ExchangeCompatibility, ExchangeConnector, SharedInfo,
};
use bidrelay::testkit::domain::campaign;
use serde_json::{json, Value};

/// Payload precomputed once at campaign-configuration time.
struct GeoTargeting {
    allowed_countries: HashSet<String>,
}

/// Exchange that restricts campaigns by country and creatives by format.
///
/// The country set is parsed once by the compatibility check and reused by
/// the post-filter through the cached `info` payload; the pre-filter only
/// checks that the request carries a country at all.
struct GeoConnector {
    control: ConnectorControl,
}

impl GeoConnector {
    fn new() -> Self {
        Self {
            control: ConnectorControl::new("geo-0"),
        }
    }
}

#[async_trait]
impl ExchangeConnector for GeoConnector {
    fn exchange_name(&self) -> &'static str {
        "geo"
    }

    fn control(&self) -> &ConnectorControl {
        &self.control
    }

    fn configure(&mut self, _parameters: &Value) -> Result<(), ConfigError> {
        Ok(())
    }

    fn campaign_compatibility(
        &self,
        config: &CampaignConfig,
        include_reasons: bool,
    ) -> CampaignCompatibility {
        let countries: Option<HashSet<String>> =
            config.attribute("allowedCountries").and_then(|value| {
                value.as_array().map(|entries| {
                    entries
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
            });

        let campaign = match countries {
            Some(allowed_countries) => ExchangeCompatibility::compatible().with_info(GeoTargeting {
                allowed_countries,
            }),
            None => {
                ExchangeCompatibility::incompatible("missing-field:allowedCountries", include_reasons)
            }
        };

        let creatives = config
            .creatives()
            .iter()
            .map(|creative| self.creative_compatibility(creative, include_reasons))
            .collect();
        CampaignCompatibility::new(campaign, creatives)
    }

    fn creative_compatibility(
        &self,
        creative: &Creative,
        include_reasons: bool,
    ) -> ExchangeCompatibility {
        match creative.attribute("format").and_then(Value::as_str) {
            Some(format) => ExchangeCompatibility::compatible().with_info(format.to_string()),
            None => ExchangeCompatibility::incompatible("missing-field:format", include_reasons),
        }
    }

    fn bid_request_pre_filter(
        &self,
        request: &BidRequest,
        _config: &CampaignConfig,
        _info: Option<&SharedInfo>,
    ) -> bool {
        request.field("country").is_some()
    }

    fn bid_request_post_filter(
        &self,
        request: &BidRequest,
        _config: &CampaignConfig,
        info: Option<&SharedInfo>,
    ) -> bool {
        let Some(targeting) = info.and_then(|info| info.downcast_ref::<GeoTargeting>()) else {
            return false;
        };
        request
            .field("country")
            .and_then(Value::as_str)
            .map_or(false, |country| {
                targeting.allowed_countries.contains(country)
            })
    }

    fn bid_request_creative_filter(
        &self,
        request: &BidRequest,
        _config: &CampaignConfig,
        info: Option<&SharedInfo>,
    ) -> bool {
        let Some(format) = info.and_then(|info| info.downcast_ref::<String>()) else {
            return false;
        };
        request.field("format").and_then(Value::as_str) == Some(format.as_str())
    }
}

fn geo_campaign() -> CampaignConfig {
    campaign(
        "camp-geo",
        vec![
            Creative::new("cr-banner", "banner", json!({"format": "banner"})),
            Creative::new("cr-video", "video", json!({"format": "video"})),
            Creative::new("cr-bare", "bare", json!({})),
        ],
        json!({"allowedCountries": ["US", "CA"]}),
    )
}

fn request_with(payload: Value) -> BidRequest {
    BidRequest::new("req-1", "geo", payload)
}

#[test]
fn campaign_is_eligible_when_both_filters_pass() {
    let connector = GeoConnector::new();
    let config = geo_campaign();
    let compatibility = connector.campaign_compatibility(&config, false);
    assert!(compatibility.is_compatible());

    let request = request_with(json!({"country": "US", "format": "banner"}));
    assert!(connector.eligible_for(&request, &config, &compatibility));
}

#[test]
fn pre_filter_rejects_requests_without_country() {
    let connector = GeoConnector::new();
    let config = geo_campaign();
    let compatibility = connector.campaign_compatibility(&config, false);

    let request = request_with(json!({"format": "banner"}));
    assert!(!connector.eligible_for(&request, &config, &compatibility));
}

#[test]
fn post_filter_rejects_untargeted_countries() {
    let connector = GeoConnector::new();
    let config = geo_campaign();
    let compatibility = connector.campaign_compatibility(&config, false);

    let request = request_with(json!({"country": "FR", "format": "banner"}));
    assert!(!connector.eligible_for(&request, &config, &compatibility));
}

#[test]
fn creative_filter_selects_matching_formats_only() {
    let connector = GeoConnector::new();
    let config = geo_campaign();
    let compatibility = connector.campaign_compatibility(&config, true);

    // The bare creative was already incompatible at configuration time.
    assert_eq!(
        compatibility.creative(2).unwrap().reasons(),
        ["missing-field:format"]
    );

    let banner_request = request_with(json!({"country": "US", "format": "banner"}));
    assert_eq!(
        connector.eligible_creatives(&banner_request, &config, &compatibility),
        vec![0]
    );

    let video_request = request_with(json!({"country": "CA", "format": "video"}));
    assert_eq!(
        connector.eligible_creatives(&video_request, &config, &compatibility),
        vec![1]
    );

    let untargeted = request_with(json!({"country": "FR", "format": "video"}));
    assert!(connector
        .eligible_creatives(&untargeted, &config, &compatibility)
        .is_empty());
}

#[test]
fn incompatible_campaign_yields_no_eligible_creatives() {
    let connector = GeoConnector::new();
    let config = campaign(
        "camp-untargeted",
        vec![Creative::new("cr", "c", json!({"format": "banner"}))],
        json!({}),
    );

    let with_reasons = connector.campaign_compatibility(&config, true);
    assert!(!with_reasons.is_compatible());
    assert_eq!(
        with_reasons.campaign().reasons(),
        ["missing-field:allowedCountries"]
    );

    let without_reasons = connector.campaign_compatibility(&config, false);
    assert!(!without_reasons.is_compatible());
    assert!(without_reasons.campaign().reasons().is_empty());

    let request = request_with(json!({"country": "US", "format": "banner"}));
    assert!(connector
        .eligible_creatives(&request, &config, &with_reasons)
        .is_empty());
}

#[test]
fn cached_info_is_shared_across_concurrent_evaluations() {
    let connector = Arc::new(GeoConnector::new());
    let config = Arc::new(geo_campaign());
    let compatibility = Arc::new(connector.campaign_compatibility(&config, false));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let connector = connector.clone();
            let config = config.clone();
            let compatibility = compatibility.clone();
            std::thread::spawn(move || {
                let country = if i % 2 == 0 { "US" } else { "FR" };
                let request = request_with(json!({"country": country, "format": "banner"}));
                connector.eligible_for(&request, &config, &compatibility)
            })
        })
        .collect();

    let verdicts: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(verdicts.iter().filter(|&&v| v).count(), 4);
}
