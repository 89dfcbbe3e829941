use crate::db::collection::{Collection, Document, Filter};
use crate::db::{Database, StoreError};
use crate::models::bid::{BUYER_EMAIL, EMAIL, JOB_ID, STATUS};
use crate::models::results::{InsertOneResult, UpdateResult};
use serde_json::{Map, Value};
use tracing::info;

const BIDS_COLLECTION: &str = "bids";

pub struct BidRepository {
    bids: Collection,
}

impl BidRepository {
    pub fn new(db: &Database) -> Result<Self, StoreError> {
        Ok(BidRepository {
            bids: db.collection(BIDS_COLLECTION)?,
        })
    }

    pub async fn find_by_bidder_and_job(
        &self,
        email: &str,
        job_id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.bids
            .find_one(&Filter::new().eq(EMAIL, email).eq(JOB_ID, job_id))
    }

    pub async fn create(&self, bid: Document) -> Result<InsertOneResult, StoreError> {
        let result = self.bids.insert_one(bid)?;
        info!(bid_id = %result.inserted_id, "Bid created in database");
        Ok(result)
    }

    pub async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        self.bids.find(&Filter::new(), None)
    }

    pub async fn list_by_bidder(&self, email: &str) -> Result<Vec<Document>, StoreError> {
        self.bids.find(&Filter::new().eq(EMAIL, email), None)
    }

    pub async fn list_by_buyer(&self, email: &str) -> Result<Vec<Document>, StoreError> {
        self.bids.find(&Filter::new().eq(BUYER_EMAIL, email), None)
    }

    pub async fn set_status(&self, id: &str, status: &str) -> Result<UpdateResult, StoreError> {
        let mut fields = Map::new();
        fields.insert(STATUS.to_string(), Value::String(status.to_string()));

        let result = self.bids.update_by_id(id, fields, false)?;
        info!(bid_id = %id, status = %status, matched = result.matched_count, "Bid status updated");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bid(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn repo() -> BidRepository {
        BidRepository::new(&Database::in_memory().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_find_by_bidder_and_job() {
        let repo = repo();
        repo.create(bid(json!({"email": "a@example.com", "jobId": "j1"})))
            .await
            .unwrap();

        assert!(repo
            .find_by_bidder_and_job("a@example.com", "j1")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_by_bidder_and_job("a@example.com", "j2")
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_by_bidder_and_job("b@example.com", "j1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_by_bidder_and_buyer() {
        let repo = repo();
        repo.create(bid(json!({"email": "a@example.com", "jobId": "j1", "buyerEmail": "b@example.com"})))
            .await
            .unwrap();
        repo.create(bid(json!({"email": "c@example.com", "jobId": "j1", "buyerEmail": "b@example.com"})))
            .await
            .unwrap();

        assert_eq!(repo.list_by_bidder("a@example.com").await.unwrap().len(), 1);
        assert_eq!(repo.list_by_buyer("b@example.com").await.unwrap().len(), 2);
        assert!(repo.list_by_buyer("a@example.com").await.unwrap().is_empty());
        assert_eq!(repo.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_set_status() {
        let repo = repo();
        let id = repo
            .create(bid(json!({"email": "a@example.com", "jobId": "j1", "status": "Pending"})))
            .await
            .unwrap()
            .inserted_id;

        let result = repo.set_status(&id, "In Progress").await.unwrap();
        assert_eq!(result.modified_count, 1);

        let bids = repo.list_by_bidder("a@example.com").await.unwrap();
        assert_eq!(bids[0][STATUS], "In Progress");

        let missing = repo.set_status("nope", "Rejected").await.unwrap();
        assert_eq!(missing.matched_count, 0);
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }
}
