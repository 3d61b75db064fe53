//! Reports from the page about what actually happened to a campaign: it was displayed,
//! permanently dismissed, or used to subscribe to a mailing list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::client::{CampaignViewRecord, EmailSubscription};
use crate::models::de::string_or_number;
use crate::store::{CampaignStore, StoreError};

pub const SUBSCRIBED_STATUS: &str = "subscribed";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportRequest {
    #[serde(alias = "client_id")]
    pub cid: String,
    #[serde(alias = "campaign_id", deserialize_with = "string_or_number")]
    pub popup_id: String,
    #[serde(default)]
    pub suppress_forever: bool,
    #[serde(default)]
    pub is_newsletter_popup: bool,
    #[serde(default)]
    pub mailing_list_status: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl ReportRequest {
    /// A plain "this campaign was displayed" report.
    #[cfg(test)]
    pub fn view(client_id: &str, campaign_id: &str) -> Self {
        Self {
            cid: client_id.to_string(),
            popup_id: campaign_id.to_string(),
            suppress_forever: false,
            is_newsletter_popup: false,
            mailing_list_status: None,
            email: None,
        }
    }

    fn subscribed_email(&self) -> Option<&str> {
        let subscribed = self
            .mailing_list_status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case(SUBSCRIBED_STATUS));
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| subscribed && !email.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub record: CampaignViewRecord,
    pub profile_updated: bool,
}

/// Applies a report to the visitor's stored state.
///
/// A dismissal sets `suppress_forever` instead of counting a view. Dismissing a
/// newsletter prompt flags the visitor for cross-campaign newsletter suppression, and a
/// successful subscription both records the address and retires the campaign.
pub async fn report_campaign(
    store: &dyn CampaignStore,
    request: &ReportRequest,
    now: DateTime<Utc>,
) -> Result<ReportOutcome, StoreError> {
    let client_id = request.cid.as_str();
    let campaign_id = request.popup_id.as_str();

    let loaded = store.get_campaign_record(client_id, campaign_id).await?;
    let mut record = loaded;

    if request.suppress_forever {
        record.suppress_forever = true;
    } else {
        record.count = record.count.saturating_add(1);
        record.last_viewed = Some(now);
    }

    let original_profile = store.get_client_profile(client_id).await?;
    let mut profile = original_profile.clone();

    if request.suppress_forever && request.is_newsletter_popup {
        profile.suppressed_newsletter_campaign = true;
    }

    if let Some(email) = request.subscribed_email() {
        let known = profile
            .email_subscriptions
            .iter()
            .any(|s| s.address.eq_ignore_ascii_case(email));
        if !known {
            profile.email_subscriptions.push(EmailSubscription {
                address: email.to_string(),
                status: request.mailing_list_status.clone(),
            });
        }
        record.suppress_forever = true;
        info!("Client {client_id} subscribed via campaign {campaign_id}");
    }

    if record != loaded {
        store
            .save_campaign_record(client_id, campaign_id, &record)
            .await?;
    }

    let profile_updated = profile != original_profile;
    if profile_updated {
        store.save_client_profile(client_id, &profile).await?;
    }

    Ok(ReportOutcome {
        record,
        profile_updated,
    })
}
