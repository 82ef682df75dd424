//! Freight Booking Engine
//!
//! The Freight Booking Engine brokers truck capacity between shippers and transporters: shippers post loads,
//! transporters bid against them, and accepting a bid converts it into a booking that permanently consumes
//! trucks from the transporter's capacity pool. This library contains the core allocation logic; it is
//! transport-agnostic and exposes no HTTP surface.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@db`]). Sqlite is the supported backend. You should never need to
//!    access the database directly; use the public APIs instead. The exception is the data types used in the
//!    database, which are defined in the [`db_types`] module and are public.
//! 2. The engine public API ([`mod@fbe_api`]). This provides the public-facing functionality: submitting and
//!    rejecting bids, accepting a bid into a booking, cancelling bookings and loads, and ranking a load's bids.
//!    Backends implement the traits in [`mod@traits`] in order to drive these APIs.
//!
//! The invariants the engine defends are allocation invariants: the trucks allocated across a load's confirmed
//! bookings never exceed what the load requires, and a transporter's capacity count never goes negative, no
//! matter how many acceptance attempts race. Both are enforced inside a single database transaction per flow,
//! combined with an optimistic version check on the load row (see [`traits::BookingGatewayDatabase`]).
mod db;

pub mod db_types;
pub mod helpers;
pub mod traits;
pub mod fbe_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use fbe_api::{
    booking_flow_api::BookingFlowApi,
    load_objects::{BidQueryFilter, LoadQueryFilter, LoadWithBids, RankedBid},
    load_query_api::LoadQueryApi,
    transporter_api::TransporterApi,
};
pub use traits::BookingGatewayError;
