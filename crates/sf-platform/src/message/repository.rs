//! Conversation and Message Repositories

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::message::entity::{Conversation, Message};
use crate::shared::error::Result;

pub struct ConversationRepository {
    collection: Collection<Conversation>,
}

impl ConversationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("conversations"),
        }
    }

    pub async fn insert(&self, conversation: &Conversation) -> Result<()> {
        self.collection.insert_one(conversation).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_course_and_student(
        &self,
        course_id: &str,
        student_id: &str,
    ) -> Result<Option<Conversation>> {
        Ok(self.collection
            .find_one(doc! { "courseId": course_id, "studentId": student_id })
            .await?)
    }

    /// Conversations where the principal participates, newest activity first
    pub async fn find_by_participant(&self, principal_id: &str) -> Result<Vec<Conversation>> {
        let options = FindOptions::builder().sort(doc! { "lastMessageAt": -1 }).build();
        let cursor = self.collection
            .find(doc! {
                "$or": [
                    { "studentId": principal_id },
                    { "instructorId": principal_id },
                ]
            })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, conversation: &Conversation) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &conversation.id }, conversation)
            .await?;
        Ok(())
    }
}

pub struct MessageRepository {
    collection: Collection<Message>,
}

impl MessageRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("messages"),
        }
    }

    pub async fn insert(&self, message: &Message) -> Result<()> {
        self.collection.insert_one(message).await?;
        Ok(())
    }

    /// Messages of a conversation, oldest first, paginated
    pub async fn find_by_conversation(
        &self,
        conversation_id: &str,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Message>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": 1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self.collection
            .find(doc! { "conversationId": conversation_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_conversation(&self, conversation_id: &str) -> Result<u64> {
        Ok(self.collection
            .count_documents(doc! { "conversationId": conversation_id })
            .await?)
    }

    /// Unread messages addressed to the principal in one conversation
    pub async fn count_unread(&self, conversation_id: &str, recipient_id: &str) -> Result<u64> {
        Ok(self.collection
            .count_documents(doc! {
                "conversationId": conversation_id,
                "read": false,
                "senderId": { "$ne": recipient_id },
            })
            .await?)
    }

    /// Mark all messages from the counterpart as read
    pub async fn mark_read(&self, conversation_id: &str, reader_id: &str) -> Result<u64> {
        let result = self.collection
            .update_many(
                doc! {
                    "conversationId": conversation_id,
                    "read": false,
                    "senderId": { "$ne": reader_id },
                },
                doc! { "$set": { "read": true } },
            )
            .await?;
        Ok(result.modified_count)
    }
}
