use fbe_common::TruckType;

use crate::{
    db_types::{NewTransporter, Transporter, TruckCapacity},
    traits::BookingGatewayError,
};

/// Transporter registration and administrative capacity management.
///
/// [`TransporterManagement::set_truck_capacities`] is the one deliberate exception to the relative-mutation
/// rule on capacity counts: it replaces a transporter's pool wholesale and exists for administrative
/// corrections, not for the allocation flows.
#[allow(async_fn_in_trait)]
pub trait TransporterManagement {
    async fn register_transporter(&self, transporter: NewTransporter) -> Result<Transporter, BookingGatewayError>;

    /// Fetches the transporter with the given id. If no transporter exists, `None` is returned.
    async fn fetch_transporter(&self, transporter_id: i64) -> Result<Option<Transporter>, BookingGatewayError>;

    /// All capacity records held by the given transporter.
    async fn fetch_truck_capacities(&self, transporter_id: i64) -> Result<Vec<TruckCapacity>, BookingGatewayError>;

    /// The transporter's capacity record for one truck type (case-insensitive match), or `None`.
    async fn fetch_capacity(
        &self,
        transporter_id: i64,
        truck_type: &TruckType,
    ) -> Result<Option<TruckCapacity>, BookingGatewayError>;

    /// Replaces the transporter's capacity pool with the given `(truck_type, count)` entries.
    async fn set_truck_capacities(
        &self,
        transporter_id: i64,
        capacities: Vec<(TruckType, i64)>,
    ) -> Result<Vec<TruckCapacity>, BookingGatewayError>;
}
