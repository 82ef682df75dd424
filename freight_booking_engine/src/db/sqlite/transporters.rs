use fbe_common::TruckType;
use log::trace;
use sqlx::{Row, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{NewTransporter, Transporter, TruckCapacity},
};

pub async fn insert_transporter(
    transporter: &NewTransporter,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let row = sqlx::query("INSERT INTO transporters (company_name, rating) VALUES (?, ?) RETURNING id")
        .bind(transporter.company_name.as_str())
        .bind(transporter.rating)
        .fetch_one(conn)
        .await?;
    Ok(row.get(0))
}

pub async fn fetch_transporter(
    transporter_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Transporter>, SqliteDatabaseError> {
    let transporter = sqlx::query_as::<_, Transporter>(
        "SELECT id, company_name, rating, created_at FROM transporters WHERE id = ?",
    )
    .bind(transporter_id)
    .fetch_optional(conn)
    .await?;
    Ok(transporter)
}

pub async fn fetch_truck_capacities(
    transporter_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<TruckCapacity>, SqliteDatabaseError> {
    let capacities = sqlx::query_as::<_, TruckCapacity>(
        "SELECT id, transporter_id, truck_type, count FROM truck_capacities WHERE transporter_id = ? \
         ORDER BY truck_type ASC",
    )
    .bind(transporter_id)
    .fetch_all(conn)
    .await?;
    Ok(capacities)
}

/// The capacity record for one `(transporter, truck type)` pool. The truck_type column carries
/// `COLLATE NOCASE`, so "flatbed" and "Flatbed" address the same row.
pub async fn fetch_capacity(
    transporter_id: i64,
    truck_type: &TruckType,
    conn: &mut SqliteConnection,
) -> Result<Option<TruckCapacity>, SqliteDatabaseError> {
    let capacity = sqlx::query_as::<_, TruckCapacity>(
        "SELECT id, transporter_id, truck_type, count FROM truck_capacities \
         WHERE transporter_id = ? AND truck_type = ?",
    )
    .bind(transporter_id)
    .bind(truck_type.as_str())
    .fetch_optional(conn)
    .await?;
    Ok(capacity)
}

/// The atomically-checked capacity decrement. The `count >= amount` predicate lives in the WHERE clause, so
/// the count can never be driven negative: a decrement that would do so matches no row and is refused with
/// [`SqliteDatabaseError::CapacityExhausted`] rather than clamped to zero.
pub(crate) async fn try_decrement_capacity(
    transporter_id: i64,
    truck_type: &TruckType,
    amount: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let result = sqlx::query(
        "UPDATE truck_capacities SET count = count - ? \
         WHERE transporter_id = ? AND truck_type = ? AND count >= ?",
    )
    .bind(amount)
    .bind(transporter_id)
    .bind(truck_type.as_str())
    .bind(amount)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(SqliteDatabaseError::CapacityExhausted(amount));
    }
    trace!("🚛️ Deducted {amount} x {truck_type} from transporter #{transporter_id}");
    Ok(())
}

/// Restores trucks to a capacity pool. Strictly frees capacity, so no guard is needed.
pub(crate) async fn increment_capacity(
    transporter_id: i64,
    truck_type: &TruckType,
    amount: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let result = sqlx::query(
        "UPDATE truck_capacities SET count = count + ? WHERE transporter_id = ? AND truck_type = ?",
    )
    .bind(amount)
    .bind(transporter_id)
    .bind(truck_type.as_str())
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        // The capacity row was deleted out from under a live booking
        return Err(SqliteDatabaseError::DriverError(sqlx::Error::RowNotFound));
    }
    trace!("🚛️ Restored {amount} x {truck_type} to transporter #{transporter_id}");
    Ok(())
}

/// Administrative wholesale replacement of a transporter's capacity pool.
pub async fn replace_capacities(
    transporter_id: i64,
    capacities: &[(TruckType, i64)],
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let _ = sqlx::query("DELETE FROM truck_capacities WHERE transporter_id = ?")
        .bind(transporter_id)
        .execute(&mut *conn)
        .await?;
    for (truck_type, count) in capacities {
        let _ = sqlx::query("INSERT INTO truck_capacities (transporter_id, truck_type, count) VALUES (?, ?, ?)")
            .bind(transporter_id)
            .bind(truck_type.as_str())
            .bind(count)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
