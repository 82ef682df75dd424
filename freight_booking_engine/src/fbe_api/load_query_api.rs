use std::fmt::Debug;

use log::trace;

use crate::{
    db_types::{Bid, BidStatus, Booking, Load, LoadId},
    fbe_api::load_objects::{BidQueryFilter, LoadQueryFilter, LoadWithBids, RankedBid},
    helpers,
    traits::{BookingGatewayError, LoadManagement, TransporterManagement},
};

/// The `LoadQueryApi` provides read access to loads, bids and bookings, and the bid ranking query.
pub struct LoadQueryApi<B> {
    db: B,
}

impl<B: Debug> Debug for LoadQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LoadQueryApi ({:?})", self.db)
    }
}

impl<B> LoadQueryApi<B>
where B: LoadManagement + TransporterManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Fetches the load with the given business key. If no load exists, `None` is returned.
    pub async fn load_by_id(&self, load_id: &LoadId) -> Result<Option<Load>, BookingGatewayError> {
        self.db.fetch_load(load_id).await
    }

    pub async fn fetch_loads(&self, query: LoadQueryFilter) -> Result<Vec<Load>, BookingGatewayError> {
        self.db.fetch_loads(query).await
    }

    pub async fn bid_by_id(&self, bid_id: i64) -> Result<Option<Bid>, BookingGatewayError> {
        self.db.fetch_bid(bid_id).await
    }

    pub async fn fetch_bids(&self, query: BidQueryFilter) -> Result<Vec<Bid>, BookingGatewayError> {
        self.db.fetch_bids(query).await
    }

    pub async fn booking_by_id(&self, booking_id: i64) -> Result<Option<Booking>, BookingGatewayError> {
        self.db.fetch_booking(booking_id).await
    }

    pub async fn confirmed_bookings(&self, load_id: &LoadId) -> Result<Vec<Booking>, BookingGatewayError> {
        self.db.fetch_confirmed_bookings(load_id).await
    }

    /// The number of trucks currently consumed by confirmed bookings on the load.
    pub async fn confirmed_allocation(&self, load_id: &LoadId) -> Result<i64, BookingGatewayError> {
        self.db.confirmed_allocation(load_id).await
    }

    /// Fetches a load together with every bid placed against it, regardless of bid status.
    pub async fn load_with_bids(&self, load_id: &LoadId) -> Result<Option<LoadWithBids>, BookingGatewayError> {
        let load = match self.db.fetch_load(load_id).await? {
            Some(load) => load,
            None => return Ok(None),
        };
        let bids = self.db.fetch_bids(BidQueryFilter::default().with_load_id(load_id.clone())).await?;
        Ok(Some(LoadWithBids { load, bids }))
    }

    /// Ranks the load's active bids best-first.
    ///
    /// `score = (1 / proposed_rate) * 0.7 + (transporter_rating / 5) * 0.3`, recomputed on every call.
    /// Only `Pending` and `Accepted` bids participate; rejected bids are no longer offers and are excluded.
    /// Equal scores keep submission order.
    ///
    /// Fails with [`BookingGatewayError::TransporterNotFound`] if a bid references a transporter that no
    /// longer exists.
    pub async fn rank_bids(&self, load_id: &LoadId) -> Result<Vec<RankedBid>, BookingGatewayError> {
        let query = BidQueryFilter::default()
            .with_load_id(load_id.clone())
            .with_status(BidStatus::Pending)
            .with_status(BidStatus::Accepted);
        let bids = self.db.fetch_bids(query).await?;
        trace!("🏆️ Ranking {} active bids for load {load_id}", bids.len());
        let mut rated = Vec::with_capacity(bids.len());
        for bid in bids {
            let transporter = self
                .db
                .fetch_transporter(bid.transporter_id)
                .await?
                .ok_or(BookingGatewayError::TransporterNotFound(bid.transporter_id))?;
            rated.push((bid, transporter.rating));
        }
        let ranked =
            helpers::rank_bids(rated).into_iter().map(|(bid, score)| RankedBid { bid, score }).collect();
        Ok(ranked)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
