//! # Database management and control.
//!
//! This module provides the interface contracts of the booking engine database *backends*.
//!
//! ## Allocation
//! The engine's one hard problem is allocating trucks from a transporter's finite, shared capacity pool under
//! concurrent acceptance attempts. The [`BookingGatewayDatabase`] trait owns every state-mutating flow:
//! submitting and rejecting bids, converting an accepted bid into a booking, and the cancellation paths.
//! Implementations must run each flow as a single atomic transaction; a failure at any step leaves no
//! partial writes behind.
//!
//! ## Traits
//! * [`BookingGatewayDatabase`] defines the mutating allocation flows.
//! * [`LoadManagement`] provides read-side queries for loads, bids and bookings.
//! * [`TransporterManagement`] covers transporter registration and administrative capacity updates.
mod booking_gateway_database;
mod load_management;
mod transporter_management;

pub use booking_gateway_database::{BookingGatewayDatabase, BookingGatewayError};
pub use load_management::LoadManagement;
pub use transporter_management::TransporterManagement;
