//! Mock connector implementations for testing.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{CampaignConfig, Creative};
use crate::error::ConfigError;
use crate::exchange::{
    CampaignCompatibility, ConnectorControl, ExchangeCompatibility, ExchangeConnector,
    ShutdownPolicy,
};

/// Connector that keeps every default: all campaigns compatible, all filters
/// pass, lifecycle backed purely by the control state.
pub struct StubConnector {
    control: ConnectorControl,
}

impl StubConnector {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            control: ConnectorControl::new(instance_name),
        }
    }

    /// Stub with a non-default shutdown policy.
    pub fn with_shutdown_policy(instance_name: impl Into<String>, policy: ShutdownPolicy) -> Self {
        Self {
            control: ConnectorControl::new(instance_name).with_shutdown_policy(policy),
        }
    }
}

#[async_trait]
impl ExchangeConnector for StubConnector {
    fn exchange_name(&self) -> &'static str {
        "stub"
    }

    fn control(&self) -> &ConnectorControl {
        &self.control
    }

    fn configure(&mut self, _parameters: &Value) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Connector that requires a configured attribute on campaigns and
/// creatives, the way a real exchange rejects items its wire format cannot
/// express.
///
/// `configure` expects `{"required_field": "<name>"}`; compatibility then
/// rejects any campaign or creative whose attribute document lacks that
/// field, with reason `missing-field:<name>` when reasons were requested.
pub struct StrictConnector {
    control: ConnectorControl,
    required_field: Option<String>,
}

impl StrictConnector {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            control: ConnectorControl::new(instance_name),
            required_field: None,
        }
    }

    fn check(&self, present: bool, include_reasons: bool) -> ExchangeCompatibility {
        match &self.required_field {
            Some(field) if !present => {
                ExchangeCompatibility::incompatible(format!("missing-field:{field}"), include_reasons)
            }
            _ => ExchangeCompatibility::compatible(),
        }
    }
}

#[async_trait]
impl ExchangeConnector for StrictConnector {
    fn exchange_name(&self) -> &'static str {
        "strict"
    }

    fn control(&self) -> &ConnectorControl {
        &self.control
    }

    fn configure(&mut self, parameters: &Value) -> Result<(), ConfigError> {
        let field = parameters
            .get("required_field")
            .and_then(Value::as_str)
            .ok_or(ConfigError::MissingField {
                field: "required_field",
            })?;
        if field.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "required_field",
                reason: "must not be empty".to_string(),
            });
        }
        self.required_field = Some(field.to_string());
        Ok(())
    }

    fn campaign_compatibility(
        &self,
        config: &CampaignConfig,
        include_reasons: bool,
    ) -> CampaignCompatibility {
        let field_present = self
            .required_field
            .as_ref()
            .map_or(true, |field| config.attribute(field).is_some());
        let campaign = self.check(field_present, include_reasons);
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
        let field_present = self
            .required_field
            .as_ref()
            .map_or(true, |field| creative.attribute(field).is_some());
        self.check(field_present, include_reasons)
    }
}
