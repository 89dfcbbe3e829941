use crate::db::collection::Document;
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

pub const EMAIL: &str = "email";
pub const JOB_ID: &str = "jobId";
pub const BUYER_EMAIL: &str = "buyerEmail";
pub const STATUS: &str = "status";

/// Bid submission. Bidder and job are required; everything else is stored as sent.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBid {
    pub email: String,
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl NewBid {
    pub fn into_document(self) -> Document {
        let mut doc = self.details;
        doc.insert(EMAIL.to_string(), Value::String(self.email));
        doc.insert(JOB_ID.to_string(), Value::String(self.job_id));
        doc
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BidStatusUpdate {
    pub status: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BidListQuery {
    /// When set, list bids received as buyer instead of bids placed
    pub buyer: Option<String>,
}

impl BidListQuery {
    pub fn as_buyer(&self) -> bool {
        matches!(self.buyer.as_deref(), Some(flag) if !flag.is_empty() && flag != "false" && flag != "0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_bid_keeps_extra_fields() {
        let bid: NewBid = serde_json::from_value(json!({
            "email": "bidder@example.com",
            "jobId": "abc",
            "price": 120,
            "buyerEmail": "buyer@example.com"
        }))
        .unwrap();

        let doc = bid.into_document();
        assert_eq!(doc[EMAIL], "bidder@example.com");
        assert_eq!(doc[JOB_ID], "abc");
        assert_eq!(doc["price"], 120);
        assert_eq!(doc[BUYER_EMAIL], "buyer@example.com");
    }

    #[test]
    fn test_new_bid_requires_bidder_and_job() {
        assert!(serde_json::from_value::<NewBid>(json!({"jobId": "abc"})).is_err());
        assert!(serde_json::from_value::<NewBid>(json!({"email": "a@b.c"})).is_err());
    }

    #[test]
    fn test_buyer_flag() {
        let flag = |v: Option<&str>| BidListQuery {
            buyer: v.map(String::from),
        }
        .as_buyer();

        assert!(flag(Some("true")));
        assert!(flag(Some("yes")));
        assert!(!flag(Some("")));
        assert!(!flag(Some("false")));
        assert!(!flag(Some("0")));
        assert!(!flag(None));
    }
}
