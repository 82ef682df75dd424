use log::trace;
use sqlx::{QueryBuilder, Row, SqliteConnection};

use crate::{
    db::sqlite::SqliteDatabaseError,
    db_types::{Load, LoadId, LoadStatus, NewLoad},
    fbe_api::load_objects::LoadQueryFilter,
};

const LOAD_COLUMNS: &str = "id, load_id, shipper_id, loading_city, unloading_city, product_type, weight, \
                            truck_type, num_of_trucks, status, version, date_posted, created_at, updated_at";

/// Inserts a new load and returns its internal row id. Inserting a load id that already exists fails with
/// [`SqliteDatabaseError::DuplicateLoad`].
pub async fn insert_load(load: &NewLoad, conn: &mut SqliteConnection) -> Result<i64, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            INSERT INTO loads (
                load_id,
                shipper_id,
                loading_city,
                unloading_city,
                product_type,
                weight,
                truck_type,
                num_of_trucks
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id;
        "#,
    )
    .bind(load.load_id.as_str())
    .bind(load.shipper_id.as_str())
    .bind(load.loading_city.as_deref())
    .bind(load.unloading_city.as_deref())
    .bind(load.product_type.as_deref())
    .bind(load.weight)
    .bind(load.truck_type.as_str())
    .bind(load.num_of_trucks)
    .fetch_one(&mut *conn)
    .await;
    match result {
        Ok(row) => Ok(row.get(0)),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Err(SqliteDatabaseError::DuplicateLoad(load.load_id.as_str().to_string()))
        },
        Err(e) => Err(e.into()),
    }
}

/// Fetches the load with the given business key.
pub async fn fetch_load(load_id: &LoadId, conn: &mut SqliteConnection) -> Result<Option<Load>, SqliteDatabaseError> {
    let load = sqlx::query_as::<_, Load>(&format!("SELECT {LOAD_COLUMNS} FROM loads WHERE load_id = ?"))
        .bind(load_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(load)
}

pub async fn fetch_load_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Load>, SqliteDatabaseError> {
    let load = sqlx::query_as::<_, Load>(&format!("SELECT {LOAD_COLUMNS} FROM loads WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(load)
}

/// Fetches loads according to criteria specified in the `LoadQueryFilter`.
///
/// Resulting loads are ordered by `date_posted` in ascending order
pub async fn fetch_loads(
    query: LoadQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Load>, SqliteDatabaseError> {
    let mut builder = QueryBuilder::new(format!("SELECT {LOAD_COLUMNS} FROM loads "));
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(shipper_id) = query.shipper_id {
        where_clause.push("shipper_id = ");
        where_clause.push_bind_unseparated(shipper_id);
    }
    if !query.statuses.is_empty() {
        let statuses: Vec<String> = query.statuses.iter().map(|s| format!("'{s}'")).collect();
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    builder.push(" ORDER BY date_posted ASC");

    trace!("📦️ Executing query: {}", builder.sql());
    let loads = builder.build_query_as::<Load>().fetch_all(conn).await?;
    trace!("Result of fetch_loads: {}", loads.len());
    Ok(loads)
}

/// The version-guarded load-status write. The update only lands if the row's version still matches the one
/// the caller read; a successful write increments the version. Zero rows affected means another transaction
/// got there first and the caller must restart from fresh reads.
pub(crate) async fn update_load_status(
    id: i64,
    status: LoadStatus,
    version: i64,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let status = status.to_string();
    let result = sqlx::query(
        "UPDATE loads SET status = ?, version = version + 1, updated_at = CURRENT_TIMESTAMP \
         WHERE id = ? AND version = ?",
    )
    .bind(status)
    .bind(id)
    .bind(version)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(SqliteDatabaseError::VersionConflict);
    }
    Ok(())
}
