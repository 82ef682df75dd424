use serde::{Deserialize, Serialize};

use crate::db_types::{Bid, BidStatus, Load, LoadId, LoadStatus};

//--------------------------------------   LoadQueryFilter    ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadQueryFilter {
    pub shipper_id: Option<String>,
    pub statuses: Vec<LoadStatus>,
}

impl LoadQueryFilter {
    pub fn with_shipper_id(mut self, shipper_id: String) -> Self {
        self.shipper_id = Some(shipper_id);
        self
    }

    pub fn with_status(mut self, status: LoadStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shipper_id.is_none() && self.statuses.is_empty()
    }
}

//--------------------------------------    BidQueryFilter    ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BidQueryFilter {
    pub load_id: Option<LoadId>,
    pub transporter_id: Option<i64>,
    pub statuses: Vec<BidStatus>,
}

impl BidQueryFilter {
    pub fn with_load_id(mut self, load_id: LoadId) -> Self {
        self.load_id = Some(load_id);
        self
    }

    pub fn with_transporter_id(mut self, transporter_id: i64) -> Self {
        self.transporter_id = Some(transporter_id);
        self
    }

    pub fn with_status(mut self, status: BidStatus) -> Self {
        self.statuses.push(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.load_id.is_none() && self.transporter_id.is_none() && self.statuses.is_empty()
    }
}

//--------------------------------------     LoadWithBids     ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadWithBids {
    pub load: Load,
    pub bids: Vec<Bid>,
}

//--------------------------------------      RankedBid       ---------------------------------------------------------
/// One entry in a [`crate::LoadQueryApi::rank_bids`] result: the bid together with its computed score.
/// Entries are ordered best-first; equal scores keep submission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedBid {
    pub bid: Bid,
    pub score: f64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn load_filter_from_json() {
        let filter: LoadQueryFilter =
            serde_json::from_str(r#"{"shipper_id": "shipper-1", "statuses": ["Posted", "OpenForBids"]}"#)
                .unwrap();
        assert_eq!(filter.shipper_id.as_deref(), Some("shipper-1"));
        assert_eq!(filter.statuses, vec![LoadStatus::Posted, LoadStatus::OpenForBids]);
        assert!(!filter.is_empty());
        // Unknown fields come from malformed client queries and must be refused
        assert!(serde_json::from_str::<LoadQueryFilter>(r#"{"shipperId": "shipper-1"}"#).is_err());
    }

    #[test]
    fn bid_filter_from_json() {
        let filter: BidQueryFilter =
            serde_json::from_str(r#"{"load_id": "L-100", "statuses": ["Pending"]}"#).unwrap();
        assert_eq!(filter.load_id, Some(LoadId::from("L-100".to_string())));
        assert_eq!(filter.transporter_id, None);
        assert_eq!(filter.statuses, vec![BidStatus::Pending]);
        assert!(BidQueryFilter::default().is_empty());
    }
}
