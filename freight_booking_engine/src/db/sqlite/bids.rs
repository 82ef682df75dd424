use log::trace;
use sqlx::{QueryBuilder, Row, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Bid, BidStatus, NewBid},
    fbe_api::load_objects::BidQueryFilter,
};

const BID_COLUMNS: &str = "id, load_id, transporter_id, proposed_rate, trucks_offered, status, submitted_at";

/// Inserts a new bid in `Pending` status and returns its row id. This is not atomic on its own; embed the
/// call in a transaction and pass `&mut *tx` as the connection argument.
pub async fn insert_bid(bid: &NewBid, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let row = sqlx::query(
        r#"
            INSERT INTO bids (load_id, transporter_id, proposed_rate, trucks_offered)
            VALUES (?, ?, ?, ?)
            RETURNING id;
        "#,
    )
    .bind(bid.load_id.as_str())
    .bind(bid.transporter_id)
    .bind(bid.proposed_rate)
    .bind(bid.trucks_offered)
    .fetch_one(conn)
    .await?;
    Ok(row.get(0))
}

pub async fn fetch_bid(bid_id: i64, conn: &mut SqliteConnection) -> Result<Option<Bid>, SqliteDatabaseError> {
    let bid = sqlx::query_as::<_, Bid>(&format!("SELECT {BID_COLUMNS} FROM bids WHERE id = ?"))
        .bind(bid_id)
        .fetch_optional(conn)
        .await?;
    Ok(bid)
}

/// Fetches bids according to criteria specified in the `BidQueryFilter`.
///
/// Resulting bids are ordered by `submitted_at` (and row id, for same-second submissions) in ascending
/// order, so downstream ranking sees them in submission order.
pub async fn fetch_bids(query: BidQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Bid>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {BID_COLUMNS} FROM bids "));
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(load_id) = query.load_id {
        where_clause.push("load_id = ");
        where_clause.push_bind_unseparated(load_id.as_str().to_string());
    }
    if let Some(transporter_id) = query.transporter_id {
        where_clause.push("transporter_id = ");
        where_clause.push_bind_unseparated(transporter_id);
    }
    if !query.statuses.is_empty() {
        let statuses: Vec<String> = query.statuses.iter().map(|s| format!("'{s}'")).collect();
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    builder.push(" ORDER BY submitted_at ASC, id ASC");

    trace!("🚚️ Executing query: {}", builder.sql());
    let bids = builder.build_query_as::<Bid>().fetch_all(conn).await?;
    trace!("Result of fetch_bids: {}", bids.len());
    Ok(bids)
}

pub(crate) async fn update_bid_status(
    bid_id: i64,
    status: BidStatus,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let status = status.to_string();
    let _ = sqlx::query("UPDATE bids SET status = ? WHERE id = ?").bind(status).bind(bid_id).execute(conn).await?;
    Ok(())
}
