use std::fmt::Debug;

use fbe_common::{Rate, TruckType};
use log::*;
use sqlx::SqlitePool;

use crate::{
    db::sqlite::{bids, bookings, db_url, loads, new_pool, transporters, SqliteDatabaseError},
    db_types::{
        Bid, BidStatus, Booking, BookingStatus, Load, LoadId, LoadStatus, NewBid, NewBooking, NewLoad,
        NewTransporter, Transporter, TruckCapacity,
    },
    fbe_api::load_objects::{BidQueryFilter, LoadQueryFilter},
    helpers,
    traits::{BookingGatewayDatabase, BookingGatewayError, LoadManagement, TransporterManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database connection pool using the URL from the environment (`FBE_DATABASE_URL`).
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl BookingGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn create_load(&self, load: NewLoad) -> Result<Load, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let id = match loads::insert_load(&load, &mut conn).await {
            Ok(id) => id,
            Err(SqliteDatabaseError::DuplicateLoad(_)) => {
                return Err(BookingGatewayError::LoadAlreadyExists(load.load_id.clone()))
            },
            Err(e) => return Err(e.into()),
        };
        debug!("🗃️ Load {} has been saved in the DB with id {id}", load.load_id);
        let stored = loads::fetch_load_by_id(id, &mut conn)
            .await?
            .ok_or_else(|| BookingGatewayError::LoadNotFound(load.load_id.clone()))?;
        Ok(stored)
    }

    async fn submit_bid(&self, bid: NewBid) -> Result<Bid, BookingGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let load = loads::fetch_load(&bid.load_id, &mut tx)
            .await?
            .ok_or_else(|| BookingGatewayError::LoadNotFound(bid.load_id.clone()))?;
        if !helpers::accepts_bids(load.status) {
            return Err(BookingGatewayError::InvalidStatusTransition(format!(
                "Cannot bid on load {} while it is {}",
                load.load_id, load.status
            )));
        }
        let transporter = transporters::fetch_transporter(bid.transporter_id, &mut tx)
            .await?
            .ok_or(BookingGatewayError::TransporterNotFound(bid.transporter_id))?;
        // Advisory check only. Nothing is reserved; acceptance re-validates against live capacity.
        let available = transporters::fetch_capacity(transporter.id, &load.truck_type, &mut tx)
            .await?
            .map(|c| c.count)
            .unwrap_or(0);
        if bid.trucks_offered > available {
            return Err(BookingGatewayError::InsufficientCapacity(format!(
                "Transporter #{} does not have enough {} trucks. Available: {available}, Requested: {}",
                transporter.id, load.truck_type, bid.trucks_offered
            )));
        }
        let bid_id = bids::insert_bid(&bid, &mut tx).await?;
        debug!("🚚️ Bid #{bid_id} submitted against load {} by transporter #{}", load.load_id, transporter.id);
        if load.status == LoadStatus::Posted {
            match loads::update_load_status(load.id, LoadStatus::OpenForBids, load.version, &mut tx).await {
                Ok(()) => {},
                Err(SqliteDatabaseError::VersionConflict) => {
                    return Err(BookingGatewayError::LoadAlreadyBooked(load.load_id.clone()))
                },
                Err(e) => return Err(e.into()),
            }
        }
        let stored =
            bids::fetch_bid(bid_id, &mut tx).await?.ok_or(BookingGatewayError::BidNotFound(bid_id))?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(stored)
    }

    async fn reject_bid(&self, bid_id: i64) -> Result<Bid, BookingGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let bid = bids::fetch_bid(bid_id, &mut tx).await?.ok_or(BookingGatewayError::BidNotFound(bid_id))?;
        if bid.status != BidStatus::Pending {
            return Err(BookingGatewayError::InvalidStatusTransition(format!(
                "Cannot reject bid #{bid_id} because it is {}",
                bid.status
            )));
        }
        bids::update_bid_status(bid_id, BidStatus::Rejected, &mut tx).await?;
        let stored =
            bids::fetch_bid(bid_id, &mut tx).await?.ok_or(BookingGatewayError::BidNotFound(bid_id))?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!("🚚️ Bid #{bid_id} rejected");
        Ok(stored)
    }

    async fn accept_bid_and_create_booking(
        &self,
        bid_id: i64,
        allocated_trucks: i64,
        final_rate: Rate,
    ) -> Result<Booking, BookingGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        // Fresh reads. Nothing from an earlier attempt may be reused: a conflicting writer invalidates
        // the aggregates as well as the load row.
        let bid = bids::fetch_bid(bid_id, &mut tx).await?.ok_or(BookingGatewayError::BidNotFound(bid_id))?;
        if bid.status != BidStatus::Pending {
            return Err(BookingGatewayError::InvalidStatusTransition(format!(
                "Cannot accept bid #{bid_id} because it is {}",
                bid.status
            )));
        }
        let load = loads::fetch_load(&bid.load_id, &mut tx)
            .await?
            .ok_or_else(|| BookingGatewayError::LoadNotFound(bid.load_id.clone()))?;
        if load.status == LoadStatus::Cancelled {
            return Err(BookingGatewayError::InvalidStatusTransition(format!(
                "Cannot accept bid #{bid_id} because load {} has been cancelled",
                load.load_id
            )));
        }
        let transporter = transporters::fetch_transporter(bid.transporter_id, &mut tx)
            .await?
            .ok_or(BookingGatewayError::TransporterNotFound(bid.transporter_id))?;

        // A booking consumes at least one truck. Without this gate a non-positive value would sail past
        // the two capacity comparisons and only die on the bookings CHECK constraint.
        if allocated_trucks < 1 {
            return Err(BookingGatewayError::InsufficientCapacity(format!(
                "Cannot allocate {allocated_trucks} trucks to bid #{bid_id}. A booking allocates at least one"
            )));
        }

        // Demand check: a booking may never allocate more trucks than the load still needs.
        let currently_allocated = bookings::confirmed_allocation(&load.load_id, &mut tx).await?;
        let remaining_required = load.num_of_trucks - currently_allocated;
        if allocated_trucks > remaining_required {
            return Err(BookingGatewayError::InsufficientCapacity(format!(
                "Cannot allocate {allocated_trucks} trucks. Only {remaining_required} needed for load {}",
                load.load_id
            )));
        }

        // Transporter-capacity check against the live count, then the guarded decrement. The decrement's
        // WHERE clause is the enforcement; the read is for the error message.
        let capacity = transporters::fetch_capacity(transporter.id, &load.truck_type, &mut tx)
            .await?
            .ok_or_else(|| BookingGatewayError::InsufficientCapacity(format!(
                "Transporter #{} has no capacity record for {}",
                transporter.id, load.truck_type
            )))?;
        if capacity.count < allocated_trucks {
            return Err(BookingGatewayError::InsufficientCapacity(format!(
                "Transporter #{} does not have enough {} trucks. Available: {}, Requested: {allocated_trucks}",
                transporter.id, load.truck_type, capacity.count
            )));
        }

        bids::update_bid_status(bid.id, BidStatus::Accepted, &mut tx).await?;
        let new_booking = NewBooking {
            load_id: load.load_id.clone(),
            bid_id: bid.id,
            transporter_id: transporter.id,
            allocated_trucks,
            final_rate,
        };
        let booking_id = bookings::insert_booking(&new_booking, &mut tx).await?;
        match transporters::try_decrement_capacity(transporter.id, &load.truck_type, allocated_trucks, &mut tx)
            .await
        {
            Ok(()) => {},
            Err(SqliteDatabaseError::CapacityExhausted(_)) => {
                return Err(BookingGatewayError::InsufficientCapacity(format!(
                    "Transporter #{} does not have enough {} trucks. Available: {}, Requested: {allocated_trucks}",
                    transporter.id, load.truck_type, capacity.count
                )))
            },
            Err(e) => return Err(e.into()),
        }
        let new_status = helpers::allocation_status(load.num_of_trucks, currently_allocated, allocated_trucks);
        match loads::update_load_status(load.id, new_status, load.version, &mut tx).await {
            Ok(()) => {},
            Err(SqliteDatabaseError::VersionConflict) => {
                warn!(
                    "🗃️ Load {} version moved past {} while accepting bid #{bid_id}. Rolling back.",
                    load.load_id, load.version
                );
                return Err(BookingGatewayError::LoadAlreadyBooked(load.load_id.clone()));
            },
            Err(e) => return Err(e.into()),
        }
        let booking = bookings::fetch_booking(booking_id, &mut tx)
            .await?
            .ok_or(BookingGatewayError::BookingNotFound(booking_id))?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!(
            "🗃️ Booking #{booking_id} confirmed: {allocated_trucks} x {} on load {} ({}/{} allocated, now {})",
            load.truck_type,
            load.load_id,
            currently_allocated + allocated_trucks,
            load.num_of_trucks,
            new_status
        );
        Ok(booking)
    }

    async fn cancel_booking(&self, booking_id: i64) -> Result<Booking, BookingGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let booking = bookings::fetch_booking(booking_id, &mut tx)
            .await?
            .ok_or(BookingGatewayError::BookingNotFound(booking_id))?;
        if booking.status == BookingStatus::Cancelled {
            return Err(BookingGatewayError::InvalidStatusTransition(format!(
                "Booking #{booking_id} is already cancelled"
            )));
        }
        let load = loads::fetch_load(&booking.load_id, &mut tx)
            .await?
            .ok_or_else(|| BookingGatewayError::LoadNotFound(booking.load_id.clone()))?;
        // Should not occur while invariants hold: a confirmed booking implies the capacity row existed.
        transporters::fetch_capacity(booking.transporter_id, &load.truck_type, &mut tx)
            .await?
            .ok_or_else(|| {
                BookingGatewayError::CapacityNotFound(booking.transporter_id, load.truck_type.clone())
            })?;
        transporters::increment_capacity(
            booking.transporter_id,
            &load.truck_type,
            booking.allocated_trucks,
            &mut tx,
        )
        .await?;
        bookings::update_booking_status(booking_id, BookingStatus::Cancelled, &mut tx).await?;
        if load.status == LoadStatus::Booked {
            let released = helpers::release_on_cancellation(load.status);
            match loads::update_load_status(load.id, released, load.version, &mut tx).await {
                Ok(()) => {},
                Err(SqliteDatabaseError::VersionConflict) => {
                    // Another cancellation (or acceptance) moved the load first; the caller retries.
                    return Err(BookingGatewayError::LoadAlreadyBooked(load.load_id.clone()));
                },
                Err(e) => return Err(e.into()),
            }
        }
        let stored = bookings::fetch_booking(booking_id, &mut tx)
            .await?
            .ok_or(BookingGatewayError::BookingNotFound(booking_id))?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!(
            "🗃️ Booking #{booking_id} cancelled. {} x {} restored to transporter #{}",
            booking.allocated_trucks, load.truck_type, booking.transporter_id
        );
        Ok(stored)
    }

    async fn cancel_load(&self, load_id: &LoadId) -> Result<Load, BookingGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        let load = loads::fetch_load(load_id, &mut tx)
            .await?
            .ok_or_else(|| BookingGatewayError::LoadNotFound(load_id.clone()))?;
        if load.status == LoadStatus::Booked {
            return Err(BookingGatewayError::InvalidStatusTransition(format!(
                "Cannot cancel load {load_id} while it is fully booked. Cancel its bookings first."
            )));
        }
        match loads::update_load_status(load.id, LoadStatus::Cancelled, load.version, &mut tx).await {
            Ok(()) => {},
            Err(SqliteDatabaseError::VersionConflict) => {
                return Err(BookingGatewayError::LoadAlreadyBooked(load_id.clone()))
            },
            Err(e) => return Err(e.into()),
        }
        let stored = loads::fetch_load(load_id, &mut tx)
            .await?
            .ok_or_else(|| BookingGatewayError::LoadNotFound(load_id.clone()))?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        debug!("🗃️ Load {load_id} cancelled");
        Ok(stored)
    }
}

impl LoadManagement for SqliteDatabase {
    async fn fetch_load(&self, load_id: &LoadId) -> Result<Option<Load>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(loads::fetch_load(load_id, &mut conn).await?)
    }

    async fn fetch_loads(&self, query: LoadQueryFilter) -> Result<Vec<Load>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(loads::fetch_loads(query, &mut conn).await?)
    }

    async fn fetch_bid(&self, bid_id: i64) -> Result<Option<Bid>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(bids::fetch_bid(bid_id, &mut conn).await?)
    }

    async fn fetch_bids(&self, query: BidQueryFilter) -> Result<Vec<Bid>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(bids::fetch_bids(query, &mut conn).await?)
    }

    async fn fetch_booking(&self, booking_id: i64) -> Result<Option<Booking>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(bookings::fetch_booking(booking_id, &mut conn).await?)
    }

    async fn fetch_confirmed_bookings(&self, load_id: &LoadId) -> Result<Vec<Booking>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(bookings::fetch_confirmed_bookings(load_id, &mut conn).await?)
    }

    async fn confirmed_allocation(&self, load_id: &LoadId) -> Result<i64, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(bookings::confirmed_allocation(load_id, &mut conn).await?)
    }
}

impl TransporterManagement for SqliteDatabase {
    async fn register_transporter(&self, transporter: NewTransporter) -> Result<Transporter, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        let id = transporters::insert_transporter(&transporter, &mut conn).await?;
        debug!("🧑️ Transporter {} registered with id {id}", transporter.company_name);
        let stored = transporters::fetch_transporter(id, &mut conn)
            .await?
            .ok_or(BookingGatewayError::TransporterNotFound(id))?;
        Ok(stored)
    }

    async fn fetch_transporter(&self, transporter_id: i64) -> Result<Option<Transporter>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(transporters::fetch_transporter(transporter_id, &mut conn).await?)
    }

    async fn fetch_truck_capacities(&self, transporter_id: i64) -> Result<Vec<TruckCapacity>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(transporters::fetch_truck_capacities(transporter_id, &mut conn).await?)
    }

    async fn fetch_capacity(
        &self,
        transporter_id: i64,
        truck_type: &TruckType,
    ) -> Result<Option<TruckCapacity>, BookingGatewayError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(transporters::fetch_capacity(transporter_id, truck_type, &mut conn).await?)
    }

    async fn set_truck_capacities(
        &self,
        transporter_id: i64,
        capacities: Vec<(TruckType, i64)>,
    ) -> Result<Vec<TruckCapacity>, BookingGatewayError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        transporters::fetch_transporter(transporter_id, &mut tx)
            .await?
            .ok_or(BookingGatewayError::TransporterNotFound(transporter_id))?;
        transporters::replace_capacities(transporter_id, &capacities, &mut tx).await?;
        let stored = transporters::fetch_truck_capacities(transporter_id, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(stored)
    }
}
