use fbe_common::{Rate, TruckType};
use thiserror::Error;

use crate::db_types::{Bid, Booking, Load, LoadId, NewBid, NewLoad};

/// This trait defines the highest level of behaviour for backends supporting the Freight Booking Engine.
///
/// Each method is one complete allocation flow and must execute as a single atomic unit against the load,
/// bid, booking and capacity records it touches. The two concurrently contended resources are the load's
/// status/version pair and the transporter's capacity count; both may only be written through the checked
/// operations described on the individual methods.
#[allow(async_fn_in_trait)]
pub trait BookingGatewayDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a newly posted load with `Posted` status and a zero allocation version.
    async fn create_load(&self, load: NewLoad) -> Result<Load, BookingGatewayError>;

    /// Submits a bid against a load. In a single atomic transaction,
    /// * verifies the load exists and its status permits bidding (`Posted` or `OpenForBids`),
    /// * verifies the transporter exists,
    /// * runs the advisory capacity check: `trucks_offered` must not exceed the transporter's current count
    ///   for the load's truck type (an absent capacity record counts as zero). The check reserves nothing;
    ///   capacity may change before acceptance.
    /// * stores the bid with `Pending` status,
    /// * moves a `Posted` load to `OpenForBids` through the version-guarded load write.
    async fn submit_bid(&self, bid: NewBid) -> Result<Bid, BookingGatewayError>;

    /// Rejects a bid. Only `Pending` bids can be rejected; anything else fails with
    /// [`BookingGatewayError::InvalidStatusTransition`].
    async fn reject_bid(&self, bid_id: i64) -> Result<Bid, BookingGatewayError>;

    /// Converts an accepted bid into a confirmed booking. In a single atomic transaction,
    /// * re-reads the bid, its load, and the transporter's capacity record for the load's truck type,
    /// * fails with [`BookingGatewayError::InvalidStatusTransition`] if the load has been cancelled,
    /// * recomputes the confirmed allocation for the load from live booking rows (never a cached counter),
    /// * fails with [`BookingGatewayError::InsufficientCapacity`] if `allocated_trucks` is less than 1,
    ///   exceeds what the load still needs, or exceeds the transporter's available count,
    /// * marks the bid `Accepted`, inserts the `Confirmed` booking, decrements the capacity count through the
    ///   guarded conditional update (refused, not clamped, if it would go negative),
    /// * recomputes the load status from the decision table and persists it with the optimistic version check.
    ///
    /// A version mismatch rolls the whole transaction back and surfaces the retryable
    /// [`BookingGatewayError::LoadAlreadyBooked`]; callers must restart from fresh reads (see
    /// [`crate::BookingFlowApi::accept_bid_with_retry`]).
    ///
    /// `allocated_trucks` need not equal the bid's `trucks_offered`; the acceptance decision may allocate
    /// fewer trucks than were offered.
    async fn accept_bid_and_create_booking(
        &self,
        bid_id: i64,
        allocated_trucks: i64,
        final_rate: Rate,
    ) -> Result<Booking, BookingGatewayError>;

    /// Cancels a confirmed booking. In a single atomic transaction,
    /// * fails with [`BookingGatewayError::InvalidStatusTransition`] if the booking is already cancelled,
    /// * restores the booking's `allocated_trucks` to the transporter's capacity count,
    /// * marks the booking `Cancelled`,
    /// * releases a `Booked` load back to `OpenForBids` through the version-guarded load write, so that
    ///   concurrent cancellations of different bookings on the same load serialize their status updates.
    async fn cancel_booking(&self, booking_id: i64) -> Result<Booking, BookingGatewayError>;

    /// Cancels a load. A `Booked` load cannot be cancelled until its bookings are cancelled first.
    async fn cancel_load(&self, load_id: &LoadId) -> Result<Load, BookingGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), BookingGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum BookingGatewayError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested load {0} does not exist")]
    LoadNotFound(LoadId),
    #[error("The requested bid (id {0}) does not exist")]
    BidNotFound(i64),
    #[error("The requested booking (id {0}) does not exist")]
    BookingNotFound(i64),
    #[error("The requested transporter (id {0}) does not exist")]
    TransporterNotFound(i64),
    #[error("Transporter {0} has no capacity record for {1}")]
    CapacityNotFound(i64, TruckType),
    #[error("Invalid status transition. {0}")]
    InvalidStatusTransition(String),
    #[error("Insufficient capacity. {0}")]
    InsufficientCapacity(String),
    #[error("Load {0} was modified or booked by another transaction. Refresh and try again.")]
    LoadAlreadyBooked(LoadId),
    #[error("Cannot insert load, since it already exists as {0}")]
    LoadAlreadyExists(LoadId),
}

impl BookingGatewayError {
    /// Whether the failed operation may succeed when restarted from fresh reads. Only the optimistic-lock
    /// conflict qualifies; every other failure is terminal for the request that produced it.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingGatewayError::LoadAlreadyBooked(_))
    }
}

impl From<sqlx::Error> for BookingGatewayError {
    fn from(e: sqlx::Error) -> Self {
        BookingGatewayError::DatabaseError(e.to_string())
    }
}
