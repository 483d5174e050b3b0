//! Recording router harness for callback assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{AuctionId, AuctionOutcome};
use crate::exchange::AuctionCallbacks;

/// Thread-safe collector standing in for the owning router.
///
/// Hands out [`AuctionCallbacks`] that record every invocation, so tests can
/// assert the exactly-once contract.
#[derive(Clone, Default)]
pub struct RecordingRouter {
    new_auctions: Arc<Mutex<Vec<AuctionId>>>,
    completions: Arc<Mutex<Vec<(AuctionId, Option<AuctionOutcome>)>>>,
}

impl RecordingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks wired to this recorder; clone-cheap, safe to hand to a
    /// connector on any thread.
    pub fn callbacks(&self) -> AuctionCallbacks {
        let new_auctions = self.new_auctions.clone();
        let completions = self.completions.clone();
        AuctionCallbacks::new(
            move |auction| new_auctions.lock().push(auction.id()),
            move |auction| completions.lock().push((auction.id(), auction.outcome())),
        )
    }

    /// Number of `on_new_auction` invocations observed.
    pub fn new_auction_count(&self) -> usize {
        self.new_auctions.lock().len()
    }

    /// Number of `on_auction_done` invocations observed.
    pub fn completed_count(&self) -> usize {
        self.completions.lock().len()
    }

    /// Every auction id handed to `on_new_auction`, in arrival order.
    pub fn new_auction_ids(&self) -> Vec<AuctionId> {
        self.new_auctions.lock().clone()
    }

    /// Every `(id, outcome)` pair handed to `on_auction_done`.
    pub fn completions(&self) -> Vec<(AuctionId, Option<AuctionOutcome>)> {
        self.completions.lock().clone()
    }
}
