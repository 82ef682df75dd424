//! Concurrent acceptance against a single shared store. The pool is restricted to one connection so that
//! every transaction is fully serialised and the assertions are deterministic; the interesting behaviour
//! is that racing acceptances never over-allocate and that losers fail loudly instead of silently.

use fbe_common::{Rate, TruckType};
use freight_booking_engine::{
    db_types::{LoadId, LoadStatus, NewBid, NewLoad, NewTransporter},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    BookingFlowApi, BookingGatewayError, LoadQueryApi, SqliteDatabase, TransporterApi,
};

async fn new_serialized_db() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 1).await.expect("Error creating database")
}

async fn transporter_with_flatbeds(db: &SqliteDatabase, name: &str, count: i64) -> i64 {
    let api = TransporterApi::new(db.clone());
    let transporter = api.register_transporter(NewTransporter::new(name.to_string(), 4.0)).await.unwrap();
    api.set_truck_capacities(transporter.id, vec![(TruckType::from("Flatbed"), count)]).await.unwrap();
    transporter.id
}

async fn flatbed_count(db: &SqliteDatabase, transporter_id: i64) -> i64 {
    TransporterApi::new(db.clone())
        .truck_capacities(transporter_id)
        .await
        .unwrap()
        .into_iter()
        .find(|c| c.truck_type == TruckType::from("Flatbed"))
        .map(|c| c.count)
        .unwrap_or(0)
}

#[tokio::test]
async fn racing_acceptances_never_over_allocate() {
    let db = new_serialized_db().await;
    let flows = BookingFlowApi::new(db.clone());
    let queries = LoadQueryApi::new(db.clone());

    let load_id: LoadId = "L-RACE-1".parse().unwrap();
    let new_load =
        NewLoad::new(load_id.clone(), "shipper-1".to_string(), TruckType::from("Flatbed"), 3);
    flows.post_load(new_load).await.unwrap();

    // Four transporters with one truck each bid for a load that needs three
    let mut bids = Vec::new();
    let mut transporters = Vec::new();
    for name in ["Racer One", "Racer Two", "Racer Three", "Racer Four"] {
        let t = transporter_with_flatbeds(&db, name, 1).await;
        let bid = flows.submit_bid(NewBid::new(load_id.clone(), t, Rate::from(10), 1)).await.unwrap();
        transporters.push(t);
        bids.push(bid.id);
    }

    let mut handles = Vec::new();
    for bid_id in &bids {
        let db = db.clone();
        let bid_id = *bid_id;
        handles.push(tokio::spawn(async move {
            let flows = BookingFlowApi::new(db);
            flows.accept_bid_with_retry(bid_id, 1, Rate::from(10), None).await
        }));
    }

    let mut winners = Vec::new();
    let mut losses = Vec::new();
    for (bid_id, handle) in bids.iter().zip(handles) {
        match handle.await.unwrap() {
            Ok(booking) => winners.push((*bid_id, booking)),
            Err(e) => losses.push((*bid_id, e)),
        }
    }

    // Exactly three trucks fit; the fourth acceptance must fail, and not quietly
    assert_eq!(winners.len(), 3);
    assert_eq!(losses.len(), 1);
    assert!(matches!(
        losses[0].1,
        BookingGatewayError::InsufficientCapacity(_) | BookingGatewayError::LoadAlreadyBooked(_)
    ));

    let load = queries.load_by_id(&load_id).await.unwrap().unwrap();
    assert_eq!(load.status, LoadStatus::Booked);
    assert_eq!(queries.confirmed_allocation(&load_id).await.unwrap(), 3);
    assert!(queries.confirmed_allocation(&load_id).await.unwrap() <= load.num_of_trucks);

    // Winners spent their truck; the loser kept its pool intact
    let mut remaining = 0;
    for t in &transporters {
        remaining += flatbed_count(&db, *t).await;
    }
    assert_eq!(remaining, 1);
}

#[tokio::test]
async fn only_one_of_two_rivals_takes_the_last_trucks() {
    let db = new_serialized_db().await;
    let flows = BookingFlowApi::new(db.clone());
    let queries = LoadQueryApi::new(db.clone());

    let load_id: LoadId = "L-RACE-2".parse().unwrap();
    let new_load =
        NewLoad::new(load_id.clone(), "shipper-1".to_string(), TruckType::from("Flatbed"), 2);
    flows.post_load(new_load).await.unwrap();

    let t_1 = transporter_with_flatbeds(&db, "Rival One", 2).await;
    let t_2 = transporter_with_flatbeds(&db, "Rival Two", 2).await;
    let bid_1 = flows.submit_bid(NewBid::new(load_id.clone(), t_1, Rate::from(10), 2)).await.unwrap();
    let bid_2 = flows.submit_bid(NewBid::new(load_id.clone(), t_2, Rate::from(11), 2)).await.unwrap();

    let handles = [bid_1.id, bid_2.id].map(|bid_id| {
        let db = db.clone();
        tokio::spawn(async move {
            let flows = BookingFlowApi::new(db);
            flows.accept_bid_with_retry(bid_id, 2, Rate::from(10), None).await
        })
    });
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        failure,
        BookingGatewayError::InsufficientCapacity(_) | BookingGatewayError::LoadAlreadyBooked(_)
    ));

    let load = queries.load_by_id(&load_id).await.unwrap().unwrap();
    assert_eq!(load.status, LoadStatus::Booked);
    assert_eq!(queries.confirmed_allocation(&load_id).await.unwrap(), 2);
    // The loser's fleet is untouched
    assert_eq!(flatbed_count(&db, t_1).await + flatbed_count(&db, t_2).await, 2);
}
