//! Builders for domain primitives used across tests.

use serde_json::{json, Value};

use crate::domain::{BidRequest, CampaignConfig, Creative};

/// A creative carrying a banner size attribute.
pub fn banner_creative(id: &str) -> Creative {
    Creative::new(id, format!("banner {id}"), json!({"bannerSize": "300x250"}))
}

/// A creative with an empty attribute document.
pub fn bare_creative(id: &str) -> Creative {
    Creative::new(id, format!("bare {id}"), json!({}))
}

/// A campaign with the given creatives and campaign-level attributes.
pub fn campaign(id: &str, creatives: Vec<Creative>, attributes: Value) -> CampaignConfig {
    CampaignConfig::new(id, "test-account", creatives, attributes)
}

/// A minimal bid request for the given exchange.
pub fn bid_request(id: &str, exchange: &str) -> BidRequest {
    BidRequest::new(id, exchange, json!({"imp": [{"id": "1"}]}))
}
