//! # Freight booking engine public API
//!
//! The `fbe_api` module exposes the programmatic API for the booking engine. The API is modular, so that
//! clients can pick the functionality they need: a bid-intake process might only construct a
//! [`booking_flow_api::BookingFlowApi`], while a dashboard only needs [`load_query_api::LoadQueryApi`].
//!
//! * [`booking_flow_api`] owns every state-mutating flow: bid submission and rejection, converting an
//!   accepted bid into a booking (with the bounded conflict-retry wrapper), and the cancellation paths.
//! * [`load_query_api`] provides read access to loads, bids and bookings, and the bid ranking query.
//! * [`transporter_api`] covers transporter registration and administrative capacity updates.
//!
//! # API usage
//!
//! The pattern for all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the traits the API requires:
//!
//! ```rust,ignore
//! use freight_booking_engine::{BookingFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new(25).await?;
//! // SqliteDatabase implements BookingGatewayDatabase
//! let api = BookingFlowApi::new(db);
//! let booking = api.accept_bid_with_retry(bid_id, 3, final_rate, None).await?;
//! ```

pub mod booking_flow_api;
pub mod load_objects;
pub mod load_query_api;
pub mod transporter_api;
