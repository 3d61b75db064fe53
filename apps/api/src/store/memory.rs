use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::client::{CampaignViewRecord, ClientProfile};
use crate::store::{campaign_key, client_key, CampaignStore, StoreError};

/// Process-local store. Used in tests and when running without Redis.
#[derive(Default)]
pub struct InMemoryStore {
    profiles: RwLock<HashMap<String, ClientProfile>>,
    records: RwLock<HashMap<String, CampaignViewRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for InMemoryStore {
    async fn get_client_profile(&self, client_id: &str) -> Result<ClientProfile, StoreError> {
        Ok(self
            .profiles
            .read()
            .await
            .get(&client_key(client_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_client_profile(
        &self,
        client_id: &str,
        profile: &ClientProfile,
    ) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(client_key(client_id), profile.clone());
        Ok(())
    }

    async fn get_campaign_record(
        &self,
        client_id: &str,
        campaign_id: &str,
    ) -> Result<CampaignViewRecord, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(&campaign_key(client_id, campaign_id))
            .copied()
            .unwrap_or_default())
    }

    async fn save_campaign_record(
        &self,
        client_id: &str,
        campaign_id: &str,
        record: &CampaignViewRecord,
    ) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(campaign_key(client_id, campaign_id), *record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_keys_read_as_defaults() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.get_client_profile("nobody").await.unwrap(),
            ClientProfile::default()
        );
        assert_eq!(
            store.get_campaign_record("nobody", "1").await.unwrap(),
            CampaignViewRecord::default()
        );
    }

    #[tokio::test]
    async fn test_records_are_isolated_per_campaign() {
        let store = InMemoryStore::new();
        let record = CampaignViewRecord {
            count: 2,
            last_viewed: None,
            suppress_forever: true,
        };
        store.save_campaign_record("amp-1", "10", &record).await.unwrap();

        assert_eq!(store.get_campaign_record("amp-1", "10").await.unwrap(), record);
        assert_eq!(
            store.get_campaign_record("amp-1", "11").await.unwrap(),
            CampaignViewRecord::default()
        );
        assert_eq!(
            store.get_campaign_record("amp-2", "10").await.unwrap(),
            CampaignViewRecord::default()
        );
    }
}
