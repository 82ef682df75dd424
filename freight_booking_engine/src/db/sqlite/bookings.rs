use sqlx::{Row, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Booking, BookingStatus, LoadId, NewBooking},
};

const BOOKING_COLUMNS: &str = "id, load_id, bid_id, transporter_id, allocated_trucks, final_rate, status, booked_at";

/// Inserts a new booking in `Confirmed` status and returns its row id. Embed the call in the allocation
/// transaction; it is not atomic on its own.
pub async fn insert_booking(booking: &NewBooking, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let row = sqlx::query(
        r#"
            INSERT INTO bookings (load_id, bid_id, transporter_id, allocated_trucks, final_rate)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id;
        "#,
    )
    .bind(booking.load_id.as_str())
    .bind(booking.bid_id)
    .bind(booking.transporter_id)
    .bind(booking.allocated_trucks)
    .bind(booking.final_rate)
    .fetch_one(conn)
    .await?;
    Ok(row.get(0))
}

pub async fn fetch_booking(
    booking_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Booking>, SqliteDatabaseError> {
    let booking = sqlx::query_as::<_, Booking>(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"))
        .bind(booking_id)
        .fetch_optional(conn)
        .await?;
    Ok(booking)
}

/// All currently confirmed bookings for the load, oldest first.
pub async fn fetch_confirmed_bookings(
    load_id: &LoadId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Booking>, SqliteDatabaseError> {
    let bookings = sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE load_id = ? AND status = 'Confirmed' ORDER BY booked_at ASC"
    ))
    .bind(load_id.as_str())
    .fetch_all(conn)
    .await?;
    Ok(bookings)
}

/// Sums `allocated_trucks` over the load's confirmed bookings, straight from live rows. The engine never
/// keeps a denormalised allocation counter; this aggregate is the single source of truth.
pub async fn confirmed_allocation(
    load_id: &LoadId,
    conn: &mut SqliteConnection,
) -> Result<i64, SqliteDatabaseError> {
    let row = sqlx::query(
        "SELECT COALESCE(SUM(allocated_trucks), 0) FROM bookings WHERE load_id = ? AND status = 'Confirmed'",
    )
    .bind(load_id.as_str())
    .fetch_one(conn)
    .await?;
    Ok(row.get(0))
}

pub(crate) async fn update_booking_status(
    booking_id: i64,
    status: BookingStatus,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let status = status.to_string();
    let _ = sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(status)
        .bind(booking_id)
        .execute(conn)
        .await?;
    Ok(())
}
