use std::cmp::Ordering;

use fbe_common::Rate;

use crate::db_types::Bid;

/// Weight of the price component in a bid's score.
const RATE_WEIGHT: f64 = 0.7;
/// Weight of the transporter-rating component in a bid's score.
const RATING_WEIGHT: f64 = 0.3;
/// Ratings are expressed on a 0-5 scale.
const MAX_RATING: f64 = 5.0;

/// Scores a bid from its proposed rate and the bidding transporter's rating.
///
/// `score = (1 / proposed_rate) * 0.7 + (rating / 5) * 0.3`
///
/// Cheaper bids and better-rated transporters score higher. `proposed_rate` is strictly positive by bid
/// invariant; `rating` lies in `0.0..=5.0`.
pub fn score(proposed_rate: Rate, rating: f64) -> f64 {
    (1.0 / proposed_rate.value()) * RATE_WEIGHT + (rating / MAX_RATING) * RATING_WEIGHT
}

/// Ranks bids by descending score. The sort is stable, so bids with equal scores keep their input order
/// (which callers provide in submission order).
///
/// Takes `(bid, transporter_rating)` pairs and returns `(bid, score)` pairs. Never mutates any state; the
/// ranking is recomputed on every call.
pub fn rank_bids(bids: Vec<(Bid, f64)>) -> Vec<(Bid, f64)> {
    let mut scored: Vec<(Bid, f64)> =
        bids.into_iter().map(|(bid, rating)| { let s = score(bid.proposed_rate, rating); (bid, s) }).collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::db_types::{BidStatus, LoadId};

    fn bid(id: i64, rate: i64) -> Bid {
        Bid {
            id,
            load_id: LoadId::from("L-100".to_string()),
            transporter_id: id,
            proposed_rate: Rate::from(rate),
            trucks_offered: 1,
            status: BidStatus::Pending,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn documented_score_values() {
        // (rate=10, rating=5) => 0.7*0.1 + 0.3*1 = 0.37
        assert!((score(Rate::from(10), 5.0) - 0.37).abs() < 1e-12);
        // (rate=20, rating=1) => 0.7*0.05 + 0.3*0.2 = 0.095
        assert!((score(Rate::from(20), 1.0) - 0.095).abs() < 1e-12);
    }

    #[test]
    fn ranking_is_descending() {
        let ranked = rank_bids(vec![(bid(1, 20), 1.0), (bid(2, 10), 5.0)]);
        assert_eq!(ranked[0].0.id, 2);
        assert_eq!(ranked[1].0.id, 1);
        assert!(ranked[0].1 > ranked[1].1);
    }

    #[test]
    fn ties_keep_submission_order() {
        // Identical rate and rating produce identical scores
        let ranked = rank_bids(vec![(bid(7, 10), 3.0), (bid(8, 10), 3.0), (bid(9, 10), 3.0)]);
        let ids: Vec<i64> = ranked.iter().map(|(b, _)| b.id).collect();
        assert_eq!(ids, vec![7, 8, 9]);
    }
}
