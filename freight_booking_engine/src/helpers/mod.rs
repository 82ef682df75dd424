mod load_status;
mod scoring;

pub use load_status::{accepts_bids, allocation_status, release_on_cancellation};
pub use scoring::{rank_bids, score};
