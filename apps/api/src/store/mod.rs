//! Visitor and campaign state persistence.
//!
//! The decision engine never talks to a store directly. Callers load records through
//! `CampaignStore`, hand them to the engine, and write back what it reports as changed.
//! A missing key always reads as the zero-value record, never as an error.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::client::{CampaignViewRecord, ClientProfile};

pub mod memory;
pub mod redis_store;

pub use self::memory::InMemoryStore;
pub use self::redis_store::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt record under '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Key-value access to client profiles and per-campaign view records.
///
/// Carried in `AppState` as `Arc<dyn CampaignStore>`.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn get_client_profile(&self, client_id: &str) -> Result<ClientProfile, StoreError>;

    async fn save_client_profile(
        &self,
        client_id: &str,
        profile: &ClientProfile,
    ) -> Result<(), StoreError>;

    async fn get_campaign_record(
        &self,
        client_id: &str,
        campaign_id: &str,
    ) -> Result<CampaignViewRecord, StoreError>;

    async fn save_campaign_record(
        &self,
        client_id: &str,
        campaign_id: &str,
        record: &CampaignViewRecord,
    ) -> Result<(), StoreError>;
}

pub(crate) fn client_key(client_id: &str) -> String {
    format!("campaigns:client:{client_id}")
}

pub(crate) fn campaign_key(client_id: &str, campaign_id: &str) -> String {
    format!("campaigns:campaign:{client_id}:{campaign_id}")
}
