//! Lesson Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::lesson::entity::Lesson;
use crate::shared::error::Result;

pub struct LessonRepository {
    collection: Collection<Lesson>,
}

impl LessonRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("lessons"),
        }
    }

    pub async fn insert(&self, lesson: &Lesson) -> Result<()> {
        self.collection.insert_one(lesson).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Lesson>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// All lessons of a chapter ordered by position
    pub async fn find_by_chapter(&self, chapter_id: &str) -> Result<Vec<Lesson>> {
        let options = FindOptions::builder().sort(doc! { "position": 1 }).build();
        let cursor = self.collection
            .find(doc! { "chapterId": chapter_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_published_by_course(&self, course_id: &str) -> Result<Vec<Lesson>> {
        let cursor = self.collection
            .find(doc! { "courseId": course_id, "status": "PUBLISHED" })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_chapter(&self, chapter_id: &str) -> Result<u64> {
        Ok(self.collection.count_documents(doc! { "chapterId": chapter_id }).await?)
    }

    pub async fn count_published_by_chapter(&self, chapter_id: &str) -> Result<u64> {
        Ok(self.collection
            .count_documents(doc! { "chapterId": chapter_id, "status": "PUBLISHED" })
            .await?)
    }

    pub async fn count_published_by_course(&self, course_id: &str) -> Result<u64> {
        Ok(self.collection
            .count_documents(doc! { "courseId": course_id, "status": "PUBLISHED" })
            .await?)
    }

    /// Any lesson referencing a media asset (for delete protection)
    pub async fn find_by_video_asset(&self, asset_id: &str) -> Result<Option<Lesson>> {
        Ok(self.collection.find_one(doc! { "videoAssetId": asset_id }).await?)
    }

    pub async fn update(&self, lesson: &Lesson) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &lesson.id }, lesson)
            .await?;
        Ok(())
    }

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

    pub async fn delete_by_chapter(&self, chapter_id: &str) -> Result<u64> {
        let result = self.collection
            .delete_many(doc! { "chapterId": chapter_id })
            .await?;
        Ok(result.deleted_count)
    }
}
