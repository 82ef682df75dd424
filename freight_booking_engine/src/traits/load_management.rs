use crate::{
    db_types::{Bid, Booking, Load, LoadId},
    fbe_api::load_objects::{BidQueryFilter, LoadQueryFilter},
    traits::BookingGatewayError,
};

/// Read-side queries over loads, bids and bookings. None of these mutate state.
#[allow(async_fn_in_trait)]
pub trait LoadManagement {
    /// Fetches the load with the given business key. If no load exists, `None` is returned.
    async fn fetch_load(&self, load_id: &LoadId) -> Result<Option<Load>, BookingGatewayError>;

    /// Fetches loads according to the criteria in the `LoadQueryFilter`, ordered by posting time ascending.
    async fn fetch_loads(&self, query: LoadQueryFilter) -> Result<Vec<Load>, BookingGatewayError>;

    async fn fetch_bid(&self, bid_id: i64) -> Result<Option<Bid>, BookingGatewayError>;

    /// Fetches bids according to the criteria in the `BidQueryFilter`, ordered by submission time ascending.
    async fn fetch_bids(&self, query: BidQueryFilter) -> Result<Vec<Bid>, BookingGatewayError>;

    async fn fetch_booking(&self, booking_id: i64) -> Result<Option<Booking>, BookingGatewayError>;

    /// All currently confirmed bookings for the given load.
    async fn fetch_confirmed_bookings(&self, load_id: &LoadId) -> Result<Vec<Booking>, BookingGatewayError>;

    /// The number of trucks currently consumed by confirmed bookings on the given load. Always recomputed
    /// from live booking rows.
    async fn confirmed_allocation(&self, load_id: &LoadId) -> Result<i64, BookingGatewayError>;
}
