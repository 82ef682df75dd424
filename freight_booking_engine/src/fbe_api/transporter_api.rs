use std::fmt::Debug;

use fbe_common::TruckType;
use log::debug;

use crate::{
    db_types::{NewTransporter, Transporter, TruckCapacity},
    traits::{BookingGatewayError, TransporterManagement},
};

/// The `TransporterApi` covers transporter registration and administrative capacity management.
///
/// [`Self::set_truck_capacities`] replaces counts absolutely. It exists for fleet administration and must
/// not be used by allocation flows, which only ever apply relative deltas through the booking gateway.
pub struct TransporterApi<B> {
    db: B,
}

impl<B: Debug> Debug for TransporterApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransporterApi ({:?})", self.db)
    }
}

impl<B> TransporterApi<B>
where B: TransporterManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn register_transporter(
        &self,
        transporter: NewTransporter,
    ) -> Result<Transporter, BookingGatewayError> {
        self.db.register_transporter(transporter).await
    }

    /// Fetches the transporter with the given id. If no transporter exists, `None` is returned.
    pub async fn transporter_by_id(&self, transporter_id: i64) -> Result<Option<Transporter>, BookingGatewayError> {
        self.db.fetch_transporter(transporter_id).await
    }

    pub async fn truck_capacities(&self, transporter_id: i64) -> Result<Vec<TruckCapacity>, BookingGatewayError> {
        self.db.fetch_truck_capacities(transporter_id).await
    }

    /// Replaces the transporter's capacity pool with the given `(truck_type, count)` entries.
    pub async fn set_truck_capacities(
        &self,
        transporter_id: i64,
        capacities: Vec<(TruckType, i64)>,
    ) -> Result<Vec<TruckCapacity>, BookingGatewayError> {
        let stored = self.db.set_truck_capacities(transporter_id, capacities).await?;
        debug!("🧑️ Capacity pool replaced for transporter #{transporter_id} ({} truck types)", stored.len());
        Ok(stored)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
