//! Bid opportunity representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single bid opportunity received from an exchange.
///
/// The payload is carried unchanged through the whole admission pipeline;
/// only the owning exchange's connector knows how to interpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidRequest {
    /// Exchange-assigned request identifier.
    id: String,
    /// Canonical name of the exchange this request came from.
    exchange: String,
    /// When the transport handed the request to the connector.
    received_at: DateTime<Utc>,
    /// Exchange-specific request document.
    payload: Value,
}

impl BidRequest {
    /// Create a new bid request stamped with the current time.
    pub fn new(id: impl Into<String>, exchange: impl Into<String>, payload: Value) -> Self {
        Self {
            id: id.into(),
            exchange: exchange.into(),
            received_at: Utc::now(),
            payload,
        }
    }

    /// Exchange-assigned request identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canonical name of the originating exchange.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// When the request was received.
    #[must_use]
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// The raw exchange-specific request document.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Look up a top-level field of the payload.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}
