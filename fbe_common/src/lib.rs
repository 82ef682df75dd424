mod rate;
mod truck_type;

pub mod op;

pub use rate::{Rate, RateConversionError};
pub use truck_type::TruckType;
