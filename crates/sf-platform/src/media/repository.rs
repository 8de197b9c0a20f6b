//! Media Asset Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::media::entity::{MediaAsset, MediaKind};
use crate::shared::error::Result;

pub struct MediaAssetRepository {
    collection: Collection<MediaAsset>,
}

impl MediaAssetRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("media_assets"),
        }
    }

    pub async fn insert(&self, asset: &MediaAsset) -> Result<()> {
        self.collection.insert_one(asset).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<MediaAsset>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_owner(
        &self,
        owner_id: &str,
        kind: Option<MediaKind>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<MediaAsset>> {
        let mut filter = doc! { "ownerId": owner_id };
        if let Some(kind) = kind {
            filter.insert("kind", format!("{:?}", kind).to_uppercase());
        }

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_owner(&self, owner_id: &str, kind: Option<MediaKind>) -> Result<u64> {
        let mut filter = doc! { "ownerId": owner_id };
        if let Some(kind) = kind {
            filter.insert("kind", format!("{:?}", kind).to_uppercase());
        }
        Ok(self.collection.count_documents(filter).await?)
    }

    pub async fn update(&self, asset: &MediaAsset) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &asset.id }, asset)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
