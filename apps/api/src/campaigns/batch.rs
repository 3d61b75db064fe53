use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::campaigns::engine::{evaluate, RequestContext};
use crate::models::campaign::{CampaignConfig, SiteSettings};
use crate::models::client::ClientProfile;
use crate::store::{CampaignStore, StoreError};

/// Campaign id -> whether to render it on this page view.
pub type Decisions = BTreeMap<String, bool>;

/// Evaluates a single campaign for a visitor, loading and persisting its state.
///
/// The service always answers through [`evaluate_batch`], which reads the profile once
/// for all candidates, so this form is only built for tests.
#[cfg(test)]
pub async fn evaluate_campaign(
    store: &dyn CampaignStore,
    client_id: &str,
    campaign: &CampaignConfig,
    settings: &SiteSettings,
    referer: &str,
    now: DateTime<Utc>,
) -> Result<bool, StoreError> {
    let profile = store.get_client_profile(client_id).await?;
    let ctx = RequestContext {
        settings,
        referer,
        now,
    };
    evaluate_one(store, client_id, &profile, campaign, &ctx).await
}

/// Evaluates every candidate campaign of a request.
///
/// The profile is read once. A campaign whose record cannot be read is answered with
/// `false`; a record that cannot be written back is logged and its decision still stands.
pub async fn evaluate_batch(
    store: &dyn CampaignStore,
    client_id: &str,
    campaigns: &[CampaignConfig],
    settings: &SiteSettings,
    referer: &str,
    now: DateTime<Utc>,
) -> Decisions {
    let mut decisions = Decisions::new();

    let profile = match store.get_client_profile(client_id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Could not load profile for client {client_id}, hiding all campaigns: {e}");
            for campaign in campaigns {
                decisions.insert(campaign.id.clone(), false);
            }
            return decisions;
        }
    };

    let ctx = RequestContext {
        settings,
        referer,
        now,
    };

    for campaign in campaigns {
        let shown = match evaluate_one(store, client_id, &profile, campaign, &ctx).await {
            Ok(shown) => shown,
            Err(e) => {
                warn!(
                    "Skipping campaign {} for client {client_id}: {e}",
                    campaign.id
                );
                false
            }
        };
        decisions.insert(campaign.id.clone(), shown);
    }

    decisions
}

/// Read failures propagate; write failures do not.
async fn evaluate_one(
    store: &dyn CampaignStore,
    client_id: &str,
    profile: &ClientProfile,
    campaign: &CampaignConfig,
    ctx: &RequestContext<'_>,
) -> Result<bool, StoreError> {
    let loaded = store.get_campaign_record(client_id, &campaign.id).await?;
    let eval = evaluate(profile, &loaded, campaign, ctx);

    debug!(
        campaign_id = %campaign.id,
        client_id,
        shown = eval.should_display,
        hidden_by = ?eval.hidden_by,
        "Evaluated campaign"
    );

    if eval.dirty {
        if let Err(e) = store
            .save_campaign_record(client_id, &campaign.id, &eval.record)
            .await
        {
            warn!(
                "Failed to persist state of campaign {} for client {client_id}: {e}",
                campaign.id
            );
        }
    }

    Ok(eval.should_display)
}
