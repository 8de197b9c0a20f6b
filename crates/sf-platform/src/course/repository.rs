//! Course Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::course::entity::{Course, CourseStatus};
use crate::shared::error::Result;

pub struct CourseRepository {
    collection: Collection<Course>,
}

impl CourseRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("courses"),
        }
    }

    pub async fn insert(&self, course: &Course) -> Result<()> {
        self.collection.insert_one(course).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Course>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        Ok(self.collection.find_one(doc! { "slug": slug }).await?)
    }

    pub async fn find_by_instructor(&self, instructor_id: &str) -> Result<Vec<Course>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection
            .find(doc! { "instructorId": instructor_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Catalog query: published courses, optionally filtered by category
    /// and a case-insensitive title prefix.
    pub async fn find_published(
        &self,
        category_id: Option<&str>,
        title_search: Option<&str>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Course>> {
        let filter = Self::catalog_filter(category_id, title_search);
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_published(
        &self,
        category_id: Option<&str>,
        title_search: Option<&str>,
    ) -> Result<u64> {
        let filter = Self::catalog_filter(category_id, title_search);
        Ok(self.collection.count_documents(filter).await?)
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Course>> {
        let cursor = self.collection
            .find(doc! { "_id": { "$in": ids } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_category(&self, category_id: &str) -> Result<Vec<Course>> {
        let cursor = self.collection
            .find(doc! { "categoryId": category_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, course: &Course) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &course.id }, course)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    fn catalog_filter(category_id: Option<&str>, title_search: Option<&str>) -> bson::Document {
        let mut filter = doc! { "status": "PUBLISHED" };

        if let Some(cid) = category_id {
            filter.insert("categoryId", cid);
        }
        if let Some(search) = title_search {
            filter.insert("title", doc! {
                "$regex": regex::escape(search),
                "$options": "i",
            });
        }

        filter
    }

    /// Status helper for callers that need draft/archived sets
    pub async fn find_by_status(&self, status: CourseStatus) -> Result<Vec<Course>> {
        let status_str = format!("{:?}", status).to_uppercase();
        let cursor = self.collection
            .find(doc! { "status": status_str })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
