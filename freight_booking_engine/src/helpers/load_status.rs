use crate::db_types::LoadStatus;

/// The load-status decision table applied after a booking commits.
///
/// `currently_allocated` is the confirmed allocation *before* this booking; `allocated_trucks` is what the
/// booking adds. The caller has already verified that the sum does not exceed `num_of_trucks`.
///
/// | condition                                              | result        |
/// |--------------------------------------------------------|---------------|
/// | `currently_allocated + allocated_trucks == num_of_trucks` | `Booked`      |
/// | otherwise (covers "still Posted" and "partially open") | `OpenForBids` |
pub fn allocation_status(num_of_trucks: i64, currently_allocated: i64, allocated_trucks: i64) -> LoadStatus {
    if currently_allocated + allocated_trucks == num_of_trucks {
        LoadStatus::Booked
    } else {
        LoadStatus::OpenForBids
    }
}

/// Whether a load in the given status may receive new bids.
pub fn accepts_bids(status: LoadStatus) -> bool {
    matches!(status, LoadStatus::Posted | LoadStatus::OpenForBids)
}

/// The load status after a booking cancellation frees capacity. A fully booked load reopens for bidding;
/// any other status is left alone.
pub fn release_on_cancellation(status: LoadStatus) -> LoadStatus {
    match status {
        LoadStatus::Booked => LoadStatus::OpenForBids,
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_fill_books_the_load() {
        assert_eq!(allocation_status(5, 3, 2), LoadStatus::Booked);
        assert_eq!(allocation_status(1, 0, 1), LoadStatus::Booked);
    }

    #[test]
    fn partial_fill_stays_open() {
        // Covers both a first partial booking on a Posted load and a follow-up partial booking
        assert_eq!(allocation_status(5, 0, 3), LoadStatus::OpenForBids);
        assert_eq!(allocation_status(5, 3, 1), LoadStatus::OpenForBids);
    }

    #[test]
    fn bidding_gate() {
        assert!(accepts_bids(LoadStatus::Posted));
        assert!(accepts_bids(LoadStatus::OpenForBids));
        assert!(!accepts_bids(LoadStatus::Booked));
        assert!(!accepts_bids(LoadStatus::Cancelled));
    }

    #[test]
    fn cancellation_release() {
        assert_eq!(release_on_cancellation(LoadStatus::Booked), LoadStatus::OpenForBids);
        assert_eq!(release_on_cancellation(LoadStatus::OpenForBids), LoadStatus::OpenForBids);
        assert_eq!(release_on_cancellation(LoadStatus::Posted), LoadStatus::Posted);
    }
}
