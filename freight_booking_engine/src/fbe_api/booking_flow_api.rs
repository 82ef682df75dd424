use std::fmt::Debug;

use fbe_common::Rate;
use log::*;

use crate::{
    db_types::{Bid, Booking, Load, LoadId, NewBid, NewLoad},
    traits::{BookingGatewayDatabase, BookingGatewayError},
};

/// Number of times a conflicted allocation is restarted before the conflict is handed to the caller.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// `BookingFlowApi` is the primary API for the engine's state-mutating flows: posting loads, submitting and
/// rejecting bids, converting an accepted bid into a booking, and the cancellation paths.
///
/// The engine holds no in-process locks. Correctness under concurrent acceptance comes from the backend's
/// versioned compare-and-write on the load row; this API's only scheduling concern is the bounded retry in
/// [`Self::accept_bid_with_retry`].
pub struct BookingFlowApi<B> {
    db: B,
}

impl<B> Debug for BookingFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BookingFlowApi")
    }
}

impl<B> BookingFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> BookingFlowApi<B>
where B: BookingGatewayDatabase
{
    /// Posts a new load on behalf of a shipper. The load starts in `Posted` status and moves to
    /// `OpenForBids` the first time a bid is submitted against it.
    pub async fn post_load(&self, load: NewLoad) -> Result<Load, BookingGatewayError> {
        let load = self.db.create_load(load).await?;
        debug!("🔄️📦️ Load {} posted by shipper {}", load.load_id, load.shipper_id);
        Ok(load)
    }

    /// Submits a bid against a load.
    ///
    /// The transporter's capacity is checked against the current count, but nothing is reserved: the check
    /// is advisory and acceptance re-validates against live data. Submission fails if the load is `Booked`
    /// or `Cancelled`.
    pub async fn submit_bid(&self, bid: NewBid) -> Result<Bid, BookingGatewayError> {
        let bid = self.db.submit_bid(bid).await?;
        debug!("🔄️🚚️ Bid #{} submitted against load {}", bid.id, bid.load_id);
        Ok(bid)
    }

    /// Rejects a `Pending` bid. Rejected bids are terminal and excluded from ranking.
    pub async fn reject_bid(&self, bid_id: i64) -> Result<Bid, BookingGatewayError> {
        self.db.reject_bid(bid_id).await
    }

    /// Accepts a bid and converts it into a confirmed booking, consuming `allocated_trucks` from the
    /// transporter's capacity pool.
    ///
    /// This is a single attempt. A concurrent writer on the same load surfaces as the retryable
    /// [`BookingGatewayError::LoadAlreadyBooked`]; most callers want [`Self::accept_bid_with_retry`], which
    /// absorbs a bounded number of such conflicts.
    pub async fn accept_bid(
        &self,
        bid_id: i64,
        allocated_trucks: i64,
        final_rate: Rate,
    ) -> Result<Booking, BookingGatewayError> {
        let booking = self.db.accept_bid_and_create_booking(bid_id, allocated_trucks, final_rate).await?;
        debug!(
            "🔄️✅️ Bid #{bid_id} accepted. Booking #{} holds {} trucks on load {}",
            booking.id, booking.allocated_trucks, booking.load_id
        );
        Ok(booking)
    }

    /// Accepts a bid, restarting the whole allocation transaction from fresh reads when an optimistic-lock
    /// conflict is detected. At most `max_attempts` attempts are made (default
    /// [`DEFAULT_MAX_ATTEMPTS`]); the final conflict is returned to the caller rather than absorbed, so
    /// exhaustion is visible and never silent. Every non-conflict error is terminal and returned as is.
    ///
    /// Each retry re-reads everything. The conflicting writer has invalidated the previous attempt's
    /// remaining-truck arithmetic, not just its final write, so resuming mid-transaction would be unsound.
    pub async fn accept_bid_with_retry(
        &self,
        bid_id: i64,
        allocated_trucks: i64,
        final_rate: Rate,
        max_attempts: Option<usize>,
    ) -> Result<Booking, BookingGatewayError> {
        let max_attempts = max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1);
        let mut last_conflict = None;
        for attempt in 1..=max_attempts {
            match self.accept_bid(bid_id, allocated_trucks, final_rate).await {
                Ok(booking) => return Ok(booking),
                Err(e) if e.is_retryable() => {
                    warn!("🔄️⚠️ Attempt {attempt}/{max_attempts} to accept bid #{bid_id} hit a conflict: {e}");
                    last_conflict = Some(e);
                },
                Err(e) => return Err(e),
            }
        }
        // max_attempts >= 1, so a conflict was recorded on the last attempt
        Err(last_conflict.unwrap_or(BookingGatewayError::BidNotFound(bid_id)))
    }

    /// Cancels a confirmed booking, restoring its trucks to the transporter's pool and reopening a fully
    /// booked load for bidding.
    pub async fn cancel_booking(&self, booking_id: i64) -> Result<Booking, BookingGatewayError> {
        let booking = self.db.cancel_booking(booking_id).await?;
        debug!(
            "🔄️❌️ Booking #{booking_id} cancelled. {} trucks restored to transporter #{}",
            booking.allocated_trucks, booking.transporter_id
        );
        Ok(booking)
    }

    /// Cancels a load. Fails while the load is fully booked; its bookings must be cancelled first.
    pub async fn cancel_load(&self, load_id: &LoadId) -> Result<Load, BookingGatewayError> {
        let load = self.db.cancel_load(load_id).await?;
        debug!("🔄️❌️ Load {load_id} cancelled");
        Ok(load)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use chrono::Utc;

    use super::*;
    use crate::db_types::BookingStatus;

    /// A backend that fails the first `failures_remaining` acceptance attempts, then succeeds. Lets the
    /// retry loop be pinned down without staging a real write race.
    #[derive(Clone)]
    struct ScriptedBackend {
        failures_remaining: Arc<AtomicUsize>,
        retryable: bool,
        attempts: Arc<AtomicUsize>,
    }

    impl ScriptedBackend {
        fn new(failures: usize, retryable: bool) -> Self {
            Self {
                failures_remaining: Arc::new(AtomicUsize::new(failures)),
                retryable,
                attempts: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    impl BookingGatewayDatabase for ScriptedBackend {
        fn url(&self) -> &str {
            "scripted"
        }

        async fn create_load(&self, _load: NewLoad) -> Result<Load, BookingGatewayError> {
            unreachable!()
        }

        async fn submit_bid(&self, _bid: NewBid) -> Result<Bid, BookingGatewayError> {
            unreachable!()
        }

        async fn reject_bid(&self, _bid_id: i64) -> Result<Bid, BookingGatewayError> {
            unreachable!()
        }

        async fn accept_bid_and_create_booking(
            &self,
            bid_id: i64,
            allocated_trucks: i64,
            final_rate: Rate,
        ) -> Result<Booking, BookingGatewayError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failures_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                let load_id: LoadId = "L-1".parse().unwrap();
                return if self.retryable {
                    Err(BookingGatewayError::LoadAlreadyBooked(load_id))
                } else {
                    Err(BookingGatewayError::InsufficientCapacity("no trucks left".to_string()))
                };
            }
            Ok(Booking {
                id: 1,
                load_id: "L-1".parse().unwrap(),
                bid_id,
                transporter_id: 1,
                allocated_trucks,
                final_rate,
                status: BookingStatus::Confirmed,
                booked_at: Utc::now(),
            })
        }

        async fn cancel_booking(&self, _booking_id: i64) -> Result<Booking, BookingGatewayError> {
            unreachable!()
        }

        async fn cancel_load(&self, _load_id: &LoadId) -> Result<Load, BookingGatewayError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn retry_absorbs_conflicts_and_succeeds() {
        let backend = ScriptedBackend::new(2, true);
        let api = BookingFlowApi::new(backend.clone());
        let booking = api.accept_bid_with_retry(1, 2, Rate::from(10), None).await.unwrap();
        assert_eq!(booking.allocated_trucks, 2);
        // Two conflicted attempts plus the successful one
        assert_eq!(backend.attempts(), 3);
    }

    #[tokio::test]
    async fn retry_exhaustion_returns_the_last_conflict() {
        let backend = ScriptedBackend::new(5, true);
        let api = BookingFlowApi::new(backend.clone());
        let err = api.accept_bid_with_retry(1, 2, Rate::from(10), Some(2)).await.unwrap_err();
        assert!(matches!(err, BookingGatewayError::LoadAlreadyBooked(_)));
        assert_eq!(backend.attempts(), 2);
    }

    #[tokio::test]
    async fn terminal_errors_are_not_retried() {
        let backend = ScriptedBackend::new(5, false);
        let api = BookingFlowApi::new(backend.clone());
        let err = api.accept_bid_with_retry(1, 2, Rate::from(10), None).await.unwrap_err();
        assert!(matches!(err, BookingGatewayError::InsufficientCapacity(_)));
        assert_eq!(backend.attempts(), 1);
    }
}
