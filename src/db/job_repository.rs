use crate::db::collection::{Collection, Document, Filter, Sort};
use crate::db::{Database, StoreError};
use crate::models::job::{BID_COUNT, BUYER_EMAIL};
use crate::models::results::{DeleteResult, InsertOneResult, UpdateResult};
use tracing::info;

const JOBS_COLLECTION: &str = "jobs";

pub struct JobRepository {
    jobs: Collection,
}

impl JobRepository {
    pub fn new(db: &Database) -> Result<Self, StoreError> {
        Ok(JobRepository {
            jobs: db.collection(JOBS_COLLECTION)?,
        })
    }

    pub async fn create(&self, job: Document) -> Result<InsertOneResult, StoreError> {
        let result = self.jobs.insert_one(job)?;
        info!(job_id = %result.inserted_id, "Job created in database");
        Ok(result)
    }

    pub async fn list(&self, filter: &Filter, sort: Option<&Sort>) -> Result<Vec<Document>, StoreError> {
        self.jobs.find(filter, sort)
    }

    pub async fn list_by_buyer(&self, email: &str) -> Result<Vec<Document>, StoreError> {
        self.jobs.find(&Filter::new().eq(BUYER_EMAIL, email), None)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        self.jobs.find_by_id(id)
    }

    /// Create-or-replace: payload fields overwrite the stored ones; an unknown id
    /// creates the job under that id.
    pub async fn upsert(&self, id: &str, job: Document) -> Result<UpdateResult, StoreError> {
        let result = self.jobs.update_by_id(id, job, true)?;
        info!(
            job_id = %id,
            matched = result.matched_count,
            upserted = result.upserted_count,
            "Job upserted in database"
        );
        Ok(result)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResult, StoreError> {
        let result = self.jobs.delete_by_id(id)?;
        info!(job_id = %id, deleted = result.deleted_count, "Job deleted from database");
        Ok(result)
    }

    pub async fn increment_bid_count(&self, id: &str) -> Result<UpdateResult, StoreError> {
        self.jobs.increment(id, BID_COUNT, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn repo() -> JobRepository {
        JobRepository::new(&Database::in_memory().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_job() {
        let repo = repo();
        let created = repo
            .create(job(json!({"title": "Logo Design", "buyer": {"email": "b@example.com"}})))
            .await
            .unwrap();

        let fetched = repo.get_by_id(&created.inserted_id).await.unwrap().unwrap();
        assert_eq!(fetched["title"], "Logo Design");
    }

    #[tokio::test]
    async fn test_list_by_buyer() {
        let repo = repo();
        repo.create(job(json!({"title": "mine", "buyer": {"email": "me@example.com"}})))
            .await
            .unwrap();
        repo.create(job(json!({"title": "theirs", "buyer": {"email": "you@example.com"}})))
            .await
            .unwrap();

        let mine = repo.list_by_buyer("me@example.com").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["title"], "mine");
    }

    #[tokio::test]
    async fn test_upsert_keeps_bid_count() {
        let repo = repo();
        let id = repo
            .create(job(json!({"title": "before"})))
            .await
            .unwrap()
            .inserted_id;
        repo.increment_bid_count(&id).await.unwrap();

        repo.upsert(&id, job(json!({"title": "after"}))).await.unwrap();

        let stored = repo.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored["title"], "after");
        assert_eq!(stored[BID_COUNT], 1);
    }

    #[tokio::test]
    async fn test_delete_job() {
        let repo = repo();
        let id = repo.create(job(json!({"title": "x"}))).await.unwrap().inserted_id;

        assert_eq!(repo.delete(&id).await.unwrap().deleted_count, 1);
        assert!(repo.get_by_id(&id).await.unwrap().is_none());
    }
}
