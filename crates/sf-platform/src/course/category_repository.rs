//! Category Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::course::category::Category;
use crate::shared::error::Result;

pub struct CategoryRepository {
    collection: Collection<Category>,
}

impl CategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("categories"),
        }
    }

    pub async fn insert(&self, category: &Category) -> Result<()> {
        self.collection.insert_one(category).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Category>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    pub async fn find_all(&self) -> Result<Vec<Category>> {
        let options = FindOptions::builder().sort(doc! { "name": 1 }).build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
