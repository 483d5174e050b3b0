//! Exchange-agnostic domain types.
//!
//! Everything the connector layer exchanges with its collaborators: bid
//! opportunities, campaigns and their creatives, and the auction lifecycle
//! object created when an opportunity is admitted. All of these are opaque
//! payloads as far as the core is concerned; exchange-specific meaning lives
//! behind the [`ExchangeConnector`](crate::exchange::ExchangeConnector)
//! implementations.

mod auction;
mod campaign;
mod request;

pub use auction::{Auction, AuctionId, AuctionOutcome, AuctionPhase};
pub use campaign::{CampaignConfig, Creative};
pub use request::BidRequest;
