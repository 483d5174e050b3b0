//! Campaign and creative configuration types.
//!
//! These are the inputs to compatibility analysis. The connector core never
//! interprets the attribute documents itself; each exchange reads whatever
//! fields its wire format requires.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A specific ad asset belonging to a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creative {
    /// Stable creative identifier.
    id: String,
    /// Human-readable name for logs and debugging.
    name: String,
    /// Exchange-relevant attributes (formats, sizes, markup, ...).
    attributes: Value,
}

impl Creative {
    /// Create a creative with the given attribute document.
    pub fn new(id: impl Into<String>, name: impl Into<String>, attributes: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attributes,
        }
    }

    /// Stable creative identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full attribute document.
    #[must_use]
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    /// Look up a top-level attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// An advertiser's configured bidding unit.
///
/// Carries an ordered creative list; per-creative compatibility results are
/// index-aligned with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Stable campaign identifier.
    id: String,
    /// Owning account name.
    account: String,
    /// Ordered creatives for this campaign.
    creatives: Vec<Creative>,
    /// Campaign-level attributes.
    attributes: Value,
}

impl CampaignConfig {
    /// Create a campaign configuration.
    pub fn new(
        id: impl Into<String>,
        account: impl Into<String>,
        creatives: Vec<Creative>,
        attributes: Value,
    ) -> Self {
        Self {
            id: id.into(),
            account: account.into(),
            creatives,
            attributes,
        }
    }

    /// Stable campaign identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Owning account name.
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The campaign's creatives, in configuration order.
    #[must_use]
    pub fn creatives(&self) -> &[Creative] {
        &self.creatives
    }

    /// The campaign-level attribute document.
    #[must_use]
    pub fn attributes(&self) -> &Value {
        &self.attributes
    }

    /// Look up a top-level campaign attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn campaign_preserves_creative_order() {
        let campaign = CampaignConfig::new(
            "c1",
            "acct",
            vec![
                Creative::new("cr-a", "banner A", json!({})),
                Creative::new("cr-b", "banner B", json!({})),
            ],
            json!({}),
        );

        let ids: Vec<&str> = campaign.creatives().iter().map(Creative::id).collect();
        assert_eq!(ids, ["cr-a", "cr-b"]);
    }

    #[test]
    fn attribute_lookup_returns_nested_value() {
        let creative = Creative::new("cr", "n", json!({"bannerSize": "300x250"}));

        assert_eq!(
            creative.attribute("bannerSize").and_then(Value::as_str),
            Some("300x250")
        );
        assert!(creative.attribute("clickUrl").is_none());
    }
}
