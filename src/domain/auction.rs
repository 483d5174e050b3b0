//! Auction lifecycle entity.
//!
//! An [`Auction`] is created when a connector admits a bid opportunity and
//! lives until its outcome is finalized. Ownership is shared between the
//! connector and the router, so lifecycle state is tracked with an atomic
//! phase tag that makes the exactly-once callback contract enforceable.

use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ConnectorError;

use super::BidRequest;

/// Unique identifier for an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuctionId(Uuid);

impl AuctionId {
    /// Generate a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AuctionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AuctionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an auction is in its admission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionPhase {
    /// Created but not yet handed to the router.
    Open,
    /// `on_new_auction` fired; outcome pending.
    Submitted,
    /// `on_auction_done` fired; terminal.
    Completed,
}

const PHASE_OPEN: u8 = 0;
const PHASE_SUBMITTED: u8 = 1;
const PHASE_COMPLETED: u8 = 2;

/// Final outcome of an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionOutcome {
    Won,
    Lost,
    TimedOut,
    Cancelled,
}

/// A bid opportunity's in-progress lifecycle object.
///
/// Created on admission, finalized on outcome. The phase tag only moves
/// forward (`Open → Submitted → Completed`), each step taken by exactly one
/// caller; a losing racer gets an error instead of a duplicate callback.
#[derive(Debug)]
pub struct Auction {
    id: AuctionId,
    exchange: String,
    request: BidRequest,
    created_at: DateTime<Utc>,
    phase: AtomicU8,
    outcome: RwLock<Option<AuctionOutcome>>,
}

impl Auction {
    /// Create a new auction for an admitted bid request.
    pub fn new(exchange: impl Into<String>, request: BidRequest) -> Self {
        Self {
            id: AuctionId::new(),
            exchange: exchange.into(),
            request,
            created_at: Utc::now(),
            phase: AtomicU8::new(PHASE_OPEN),
            outcome: RwLock::new(None),
        }
    }

    /// Unique auction identifier.
    #[must_use]
    pub fn id(&self) -> AuctionId {
        self.id
    }

    /// Canonical name of the exchange this auction came from.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// The bid request that triggered this auction.
    #[must_use]
    pub fn request(&self) -> &BidRequest {
        &self.request
    }

    /// When the auction was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> AuctionPhase {
        match self.phase.load(Ordering::Acquire) {
            PHASE_OPEN => AuctionPhase::Open,
            PHASE_SUBMITTED => AuctionPhase::Submitted,
            _ => AuctionPhase::Completed,
        }
    }

    /// Final outcome, once completed.
    #[must_use]
    pub fn outcome(&self) -> Option<AuctionOutcome> {
        *self.outcome.read()
    }

    /// Move `Open → Submitted`. Exactly one caller wins.
    pub(crate) fn mark_submitted(&self) -> Result<(), ConnectorError> {
        self.phase
            .compare_exchange(
                PHASE_OPEN,
                PHASE_SUBMITTED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|_| ConnectorError::AlreadySubmitted { id: self.id })
    }

    /// Move `Submitted → Completed` and record the outcome. Exactly one
    /// caller wins; completing an auction that was never submitted is an
    /// error as well.
    pub(crate) fn mark_completed(&self, outcome: AuctionOutcome) -> Result<(), ConnectorError> {
        match self.phase.compare_exchange(
            PHASE_SUBMITTED,
            PHASE_COMPLETED,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                *self.outcome.write() = Some(outcome);
                Ok(())
            }
            Err(PHASE_OPEN) => Err(ConnectorError::NeverSubmitted { id: self.id }),
            Err(_) => Err(ConnectorError::AlreadyCompleted { id: self.id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn auction() -> Auction {
        Auction::new("acme", BidRequest::new("r1", "acme", json!({})))
    }

    #[test]
    fn ids_are_distinct() {
        assert_ne!(auction().id(), auction().id());
    }

    #[test]
    fn phase_advances_exactly_once() {
        let auction = auction();
        assert_eq!(auction.phase(), AuctionPhase::Open);

        auction.mark_submitted().unwrap();
        assert_eq!(auction.phase(), AuctionPhase::Submitted);
        assert!(matches!(
            auction.mark_submitted(),
            Err(ConnectorError::AlreadySubmitted { .. })
        ));

        auction.mark_completed(AuctionOutcome::Won).unwrap();
        assert_eq!(auction.phase(), AuctionPhase::Completed);
        assert_eq!(auction.outcome(), Some(AuctionOutcome::Won));
        assert!(matches!(
            auction.mark_completed(AuctionOutcome::Lost),
            Err(ConnectorError::AlreadyCompleted { .. })
        ));
        // Losing completion must not clobber the recorded outcome.
        assert_eq!(auction.outcome(), Some(AuctionOutcome::Won));
    }

    #[test]
    fn completion_requires_submission() {
        let auction = auction();
        assert!(matches!(
            auction.mark_completed(AuctionOutcome::Cancelled),
            Err(ConnectorError::NeverSubmitted { .. })
        ));
        assert_eq!(auction.outcome(), None);
    }
}
