//! Principal Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::Principal;
use crate::shared::error::Result;

pub struct PrincipalRepository {
    collection: Collection<Principal>,
}

impl PrincipalRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("principals"),
        }
    }

    pub async fn insert(&self, principal: &Principal) -> Result<()> {
        self.collection.insert_one(principal).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Principal>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Principal>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<Principal>> {
        Ok(self.collection.find_one(doc! { "externalId": external_id }).await?)
    }

    pub async fn find_page(&self, skip: u64, limit: i64) -> Result<Vec<Principal>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    pub async fn search_by_name_or_email(&self, query: &str, limit: i64) -> Result<Vec<Principal>> {
        let pattern = format!("^{}", regex::escape(query));
        let filter = doc! {
            "$or": [
                { "email": { "$regex": &pattern, "$options": "i" } },
                { "displayName": { "$regex": &pattern, "$options": "i" } },
            ]
        };
        let options = FindOptions::builder().limit(limit).build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, principal: &Principal) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &principal.id }, principal)
            .await?;
        Ok(())
    }
}
