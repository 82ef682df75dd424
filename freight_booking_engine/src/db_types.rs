use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fbe_common::{Rate, TruckType};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        LoadId        ---------------------------------------------------------
/// The business key of a load, as assigned by the posting shipper's system. Distinct from the internal row id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct LoadId(pub String);

impl FromStr for LoadId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for LoadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for LoadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl LoadId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct ConversionError(String);

//--------------------------------------      LoadStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum LoadStatus {
    /// The load has been posted by the shipper and no bids have been received.
    Posted,
    /// At least one bid exists, or a partial booking has left trucks unallocated.
    OpenForBids,
    /// Every required truck is covered by a confirmed booking.
    Booked,
    /// The load has been withdrawn by the shipper.
    Cancelled,
}

impl Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Posted => write!(f, "Posted"),
            LoadStatus::OpenForBids => write!(f, "OpenForBids"),
            LoadStatus::Booked => write!(f, "Booked"),
            LoadStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for LoadStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Posted" => Ok(Self::Posted),
            "OpenForBids" => Ok(Self::OpenForBids),
            "Booked" => Ok(Self::Booked),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid load status: {s}"))),
        }
    }
}

//--------------------------------------      BidStatus       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum BidStatus {
    /// The bid has been submitted and is awaiting a decision.
    Pending,
    /// The bid was accepted and a booking exists for it. Terminal.
    Accepted,
    /// The bid was explicitly rejected. Terminal.
    Rejected,
}

impl Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BidStatus::Pending => write!(f, "Pending"),
            BidStatus::Accepted => write!(f, "Accepted"),
            BidStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for BidStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Accepted" => Ok(Self::Accepted),
            "Rejected" => Ok(Self::Rejected),
            s => Err(ConversionError(format!("Invalid bid status: {s}"))),
        }
    }
}

//--------------------------------------    BookingStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "Confirmed"),
            BookingStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Confirmed" => Ok(Self::Confirmed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid booking status: {s}"))),
        }
    }
}

//--------------------------------------        Load          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Load {
    pub id: i64,
    pub load_id: LoadId,
    pub shipper_id: String,
    pub loading_city: Option<String>,
    pub unloading_city: Option<String>,
    pub product_type: Option<String>,
    pub weight: Option<f64>,
    pub truck_type: TruckType,
    pub num_of_trucks: i64,
    pub status: LoadStatus,
    /// Optimistic lock counter. Every committed status write increments it; a stale reader's write is refused.
    pub version: i64,
    pub date_posted: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewLoad        ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewLoad {
    /// The load id as assigned by the shipper's system
    pub load_id: LoadId,
    pub shipper_id: String,
    /// Pickup city. Descriptive only; the engine never interprets it.
    pub loading_city: Option<String>,
    /// Delivery city. Descriptive only.
    pub unloading_city: Option<String>,
    pub product_type: Option<String>,
    pub weight: Option<f64>,
    /// The single truck type this load requires
    pub truck_type: TruckType,
    /// Total number of trucks required
    pub num_of_trucks: i64,
}

impl NewLoad {
    pub fn new(load_id: LoadId, shipper_id: String, truck_type: TruckType, num_of_trucks: i64) -> Self {
        Self {
            load_id,
            shipper_id,
            loading_city: None,
            unloading_city: None,
            product_type: None,
            weight: None,
            truck_type,
            num_of_trucks,
        }
    }

    pub fn with_route(mut self, loading_city: String, unloading_city: String) -> Self {
        self.loading_city = Some(loading_city);
        self.unloading_city = Some(unloading_city);
        self
    }

    pub fn with_product(mut self, product_type: String, weight: f64) -> Self {
        self.product_type = Some(product_type);
        self.weight = Some(weight);
        self
    }
}

//--------------------------------------         Bid          ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Bid {
    pub id: i64,
    pub load_id: LoadId,
    pub transporter_id: i64,
    pub proposed_rate: Rate,
    pub trucks_offered: i64,
    pub status: BidStatus,
    pub submitted_at: DateTime<Utc>,
}

//--------------------------------------       NewBid         ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewBid {
    pub load_id: LoadId,
    pub transporter_id: i64,
    /// The offered rate. Strictly positive.
    pub proposed_rate: Rate,
    /// The number of trucks offered. At least 1. Submission does not reserve them.
    pub trucks_offered: i64,
}

impl NewBid {
    pub fn new(load_id: LoadId, transporter_id: i64, proposed_rate: Rate, trucks_offered: i64) -> Self {
        Self { load_id, transporter_id, proposed_rate, trucks_offered }
    }
}

//--------------------------------------       Booking        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub load_id: LoadId,
    pub bid_id: i64,
    pub transporter_id: i64,
    pub allocated_trucks: i64,
    pub final_rate: Rate,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}

//--------------------------------------      NewBooking      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub load_id: LoadId,
    pub bid_id: i64,
    pub transporter_id: i64,
    /// Trucks consumed by this booking. May be fewer than the bid offered, never more than the load still needs.
    pub allocated_trucks: i64,
    pub final_rate: Rate,
}

//--------------------------------------     Transporter      ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transporter {
    pub id: i64,
    pub company_name: String,
    /// Service rating in `0.0..=5.0`, used by the bid scoring engine.
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTransporter {
    pub company_name: String,
    pub rating: f64,
}

impl NewTransporter {
    pub fn new(company_name: String, rating: f64) -> Self {
        Self { company_name, rating }
    }
}

//--------------------------------------    TruckCapacity     ---------------------------------------------------------
/// A transporter's available truck count for one truck type. `count` is never negative; the only writers are
/// the guarded decrement in the allocation transaction, the increment in booking cancellation, and the
/// administrative replace in [`crate::TransporterApi`].
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TruckCapacity {
    pub id: i64,
    pub transporter_id: i64,
    pub truck_type: TruckType,
    pub count: i64,
}
