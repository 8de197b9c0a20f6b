//! Chapter Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::chapter::entity::Chapter;
use crate::shared::error::Result;

pub struct ChapterRepository {
    collection: Collection<Chapter>,
}

impl ChapterRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("chapters"),
        }
    }

    pub async fn insert(&self, chapter: &Chapter) -> Result<()> {
        self.collection.insert_one(chapter).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Chapter>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// All chapters of a course ordered by position
    pub async fn find_by_course(&self, course_id: &str) -> Result<Vec<Chapter>> {
        let options = FindOptions::builder().sort(doc! { "position": 1 }).build();
        let cursor = self.collection
            .find(doc! { "courseId": course_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_published_by_course(&self, course_id: &str) -> Result<Vec<Chapter>> {
        let options = FindOptions::builder().sort(doc! { "position": 1 }).build();
        let cursor = self.collection
            .find(doc! { "courseId": course_id, "status": "PUBLISHED" })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_course(&self, course_id: &str) -> Result<u64> {
        Ok(self.collection.count_documents(doc! { "courseId": course_id }).await?)
    }

    pub async fn count_published_by_course(&self, course_id: &str) -> Result<u64> {
        Ok(self.collection
            .count_documents(doc! { "courseId": course_id, "status": "PUBLISHED" })
            .await?)
    }

    pub async fn update(&self, chapter: &Chapter) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &chapter.id }, chapter)
            .await?;
        Ok(())
    }

    /// Set the position of a single chapter
    pub async fn set_position(&self, id: &str, position: u32) -> Result<()> {
        self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "position": position as i64, "updatedAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
