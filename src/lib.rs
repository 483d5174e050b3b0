//! Bidrelay - pluggable exchange-connector layer for a real-time bidding
//! router.
//!
//! A router accepts bid opportunities from many external ad exchanges, each
//! with its own wire format and eligibility rules, through one uniform
//! interface. This crate is that interface:
//!
//! - **[`exchange::ExchangeConnector`]** - the adapter contract: lifecycle,
//!   the owner's control surface (enable window, accept-probability
//!   throttle), auction-injection callbacks, compatibility checks, and the
//!   staged filter pipeline (pre → post → creative, ordered by cost).
//! - **[`exchange::ConnectorRegistry`]** - name-keyed factory registry so
//!   new exchange adapters plug in without modifying the router.
//! - **[`domain`]** - the opaque payloads exchanged with collaborators:
//!   bid requests, campaigns, creatives, and the auction lifecycle entity.
//!
//! Compatibility is computed once per campaign configuration change and
//! cached by the caller; per-request filtering reuses the cached `info`
//! payload, keeping the hot path allocation-free.
//!
//! # Modules
//!
//! - [`domain`] - Exchange-agnostic types: bid requests, campaigns, auctions
//! - [`error`] - Error types for the crate
//! - [`exchange`] - Connector trait, control state, compatibility, registry
//!
//! # Features
//!
//! - `testkit` - Mock connectors and a recording router harness for tests
//!
//! # Example
//!
//! ```no_run
//! use bidrelay::exchange::{AuctionCallbacks, ConnectorRegistry};
//!
//! # fn factories(registry: &ConnectorRegistry) {}
//! let registry = ConnectorRegistry::new();
//! factories(&registry); // each exchange registers itself at startup
//!
//! let connector = registry.create("acme", "acme-worker-0").unwrap();
//! let callbacks = AuctionCallbacks::new(
//!     |auction| println!("new auction {}", auction.id()),
//!     |auction| println!("auction done {}", auction.id()),
//! );
//! # drop((connector, callbacks));
//! ```

pub mod domain;
pub mod error;
pub mod exchange;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
