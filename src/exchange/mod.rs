//! Exchange connector abstraction layer.
//!
//! ## Adding a New Exchange
//!
//! 1. Create a module for the exchange and embed a [`ConnectorControl`]
//! 2. Implement [`ExchangeConnector`] with:
//!    - `exchange_name()` - canonical exchange identifier
//!    - `control()` - accessor for the embedded control state
//!    - `configure()` - validation of the exchange's parameter document
//! 3. Override `creative_compatibility()` / `campaign_compatibility()` for
//!    whatever the exchange's wire format requires, stashing precomputed
//!    data in the result's `info` payload
//! 4. Override the filter stages that the exchange restricts; defaults pass
//! 5. Register a factory with [`ConnectorRegistry`] at startup
//!
//! The transport that receives bid requests calls
//! [`admit_bid_request`](ExchangeConnector::admit_bid_request) per decoded
//! opportunity and [`complete_auction`](ConnectorControl::complete_auction)
//! when the outcome is known; the exactly-once callback contract is enforced
//! underneath.

mod compatibility;
mod connector;
mod control;
mod registry;

pub use compatibility::{CampaignCompatibility, ExchangeCompatibility, SharedInfo};
pub use connector::ExchangeConnector;
pub use control::{AuctionCallbacks, ConnectorControl, OnAuction, ShutdownPolicy};
pub use registry::{ConnectorFactory, ConnectorRegistry};
