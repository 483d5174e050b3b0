use thiserror::Error;

use crate::domain::AuctionId;

/// Configuration-related errors with structured variants.
///
/// Returned by [`configure`](crate::exchange::ExchangeConnector::configure)
/// when an exchange rejects malformed parameters. Fatal to starting that one
/// connector instance, isolated from other connectors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Registry lookup and registration errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// `create` was called with a name no factory was registered under.
    ///
    /// Non-fatal to the router; only that creation attempt fails.
    #[error("unknown exchange type: {exchange_type}")]
    UnknownExchangeType { exchange_type: String },

    /// A factory was already registered under this name.
    #[error("exchange type already registered: {exchange_type}")]
    DuplicateRegistration { exchange_type: String },
}

/// Violations of the auction callback contract.
///
/// Every admitted opportunity gets exactly one `on_new_auction` and exactly
/// one `on_auction_done`. Attempts to break that surface here instead of
/// reaching the router twice.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("connector is not running")]
    NotRunning,

    #[error("auction {id} was already submitted")]
    AlreadySubmitted { id: AuctionId },

    #[error("auction {id} was already completed")]
    AlreadyCompleted { id: AuctionId },

    #[error("auction {id} completed without a matching submission")]
    NeverSubmitted { id: AuctionId },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
