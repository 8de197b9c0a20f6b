//! OIDC Login State Repository

use mongodb::{Collection, Database, bson::doc};
use crate::auth::login_state::OidcLoginState;
use crate::shared::error::Result;

pub struct OidcLoginStateRepository {
    collection: Collection<OidcLoginState>,
}

impl OidcLoginStateRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("oidc_login_states"),
        }
    }

    pub async fn insert(&self, state: &OidcLoginState) -> Result<()> {
        self.collection.insert_one(state).await?;
        Ok(())
    }

    /// Consume a login state: fetch and delete in one pass so each state
    /// can only be redeemed once.
    pub async fn take(&self, state: &str) -> Result<Option<OidcLoginState>> {
        Ok(self.collection.find_one_and_delete(doc! { "_id": state }).await?)
    }

    /// Remove expired states
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = self.collection
            .delete_many(doc! { "expiresAt": { "$lt": bson::DateTime::now() } })
            .await?;
        Ok(result.deleted_count)
    }
}
