use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::models::client::{CampaignViewRecord, ClientProfile};
use crate::store::{campaign_key, client_key, CampaignStore, StoreError};

/// Redis-backed store. Each record is a JSON string under its own key.
///
/// Writes are plain `SET`s: concurrent requests for the same visitor are last-write-wins.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    ttl_secs: Option<u64>,
}

impl RedisStore {
    pub async fn connect(
        client: &redis::Client,
        ttl_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        let conn = client.get_multiplexed_async_connection().await?;
        info!(
            "Redis campaign store connected (ttl: {})",
            ttl_secs.map_or_else(|| "none".to_string(), |t| format!("{t}s"))
        );
        Ok(Self { conn, ttl_secs })
    }

    async fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            None => {
                debug!("No record under {key}, using defaults");
                Ok(T::default())
            }
            Some(json) => serde_json::from_str(&json).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        let mut conn = self.conn.clone();
        match self.ttl_secs {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, json, ttl).await?,
            None => conn.set::<_, _, ()>(key, json).await?,
        }
        Ok(())
    }
}

#[async_trait]
impl CampaignStore for RedisStore {
    async fn get_client_profile(&self, client_id: &str) -> Result<ClientProfile, StoreError> {
        self.read(&client_key(client_id)).await
    }

    async fn save_client_profile(
        &self,
        client_id: &str,
        profile: &ClientProfile,
    ) -> Result<(), StoreError> {
        self.write(&client_key(client_id), profile).await
    }

    async fn get_campaign_record(
        &self,
        client_id: &str,
        campaign_id: &str,
    ) -> Result<CampaignViewRecord, StoreError> {
        self.read(&campaign_key(client_id, campaign_id)).await
    }

    async fn save_campaign_record(
        &self,
        client_id: &str,
        campaign_id: &str,
        record: &CampaignViewRecord,
    ) -> Result<(), StoreError> {
        self.write(&campaign_key(client_id, campaign_id), record).await
    }
}
