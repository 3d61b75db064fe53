use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post the visitor has read, with the categories it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRead {
    pub post_id: u64,
    #[serde(default)]
    pub category_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSubscription {
    pub address: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Everything we know about a single visitor across campaigns.
///
/// Missing keys in the store decode to `ClientProfile::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(default)]
    pub posts_read: Vec<PostRead>,
    #[serde(default)]
    pub donations: Vec<Donation>,
    #[serde(default)]
    pub email_subscriptions: Vec<EmailSubscription>,
    #[serde(default)]
    pub suppressed_newsletter_campaign: bool,
}

impl ClientProfile {
    pub fn has_read(&self, post_id: u64) -> bool {
        self.posts_read.iter().any(|p| p.post_id == post_id)
    }

    pub fn posts_read_count(&self) -> usize {
        self.posts_read.len()
    }

    pub fn is_donor(&self) -> bool {
        !self.donations.is_empty()
    }

    pub fn has_email_subscription(&self) -> bool {
        !self.email_subscriptions.is_empty()
    }
}

/// Per visitor, per campaign display state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignViewRecord {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub last_viewed: Option<DateTime<Utc>>,
    /// Sticky. Nothing in this service ever clears it.
    #[serde(default)]
    pub suppress_forever: bool,
}
