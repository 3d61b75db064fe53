//! Campaign visibility decision.
//!
//! `evaluate` is pure: the caller loads the visitor's profile and the campaign's view
//! record, and persists the returned record when `dirty` is set. Stages run in a fixed
//! order and can only hide the campaign or set `suppress_forever`, never undo either.

use chrono::{DateTime, Duration, Utc};

use crate::campaigns::referer::{has_email_medium, matches_utm_source};
use crate::campaigns::segmentation::{evaluate_segment, Audience, SegmentRule};
use crate::models::campaign::{CampaignConfig, Frequency, SiteSettings};
use crate::models::client::{CampaignViewRecord, ClientProfile};

/// Minimum gap between two displays of a `daily` campaign.
pub const DAILY_INTERVAL_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideReason {
    SuppressedForever,
    Frequency(Frequency),
    UtmSource,
    EmailMedium,
    NewsletterDismissed,
    Donor,
    Segment(SegmentRule),
}

/// Inputs that are fixed for the duration of a request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub settings: &'a SiteSettings,
    pub referer: &'a str,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub should_display: bool,
    pub record: CampaignViewRecord,
    /// `record` differs from what was loaded and should be written back.
    pub dirty: bool,
    pub hidden_by: Vec<HideReason>,
}

impl Evaluation {
    fn hide(&mut self, reason: HideReason) {
        self.should_display = false;
        self.hidden_by.push(reason);
    }

    fn suppress_forever(&mut self, reason: HideReason) {
        self.hide(reason);
        self.record.suppress_forever = true;
    }
}

pub fn frequency_allows(
    frequency: Frequency,
    record: &CampaignViewRecord,
    now: DateTime<Utc>,
) -> bool {
    match frequency {
        Frequency::Daily => record
            .last_viewed
            .map_or(true, |seen| now - seen >= Duration::hours(DAILY_INTERVAL_HOURS)),
        Frequency::Once => record.count < 1,
        Frequency::Always => true,
        Frequency::Never => false,
    }
}

pub fn evaluate(
    profile: &ClientProfile,
    loaded: &CampaignViewRecord,
    campaign: &CampaignConfig,
    ctx: &RequestContext<'_>,
) -> Evaluation {
    let mut eval = Evaluation {
        should_display: true,
        record: *loaded,
        dirty: false,
        hidden_by: Vec::new(),
    };

    if loaded.suppress_forever {
        eval.hide(HideReason::SuppressedForever);
        return eval;
    }

    if !frequency_allows(campaign.frequency, loaded, ctx.now) {
        eval.hide(HideReason::Frequency(campaign.frequency));
    }

    let settings = ctx.settings;
    let from_email = has_email_medium(ctx.referer);

    if !ctx.referer.is_empty() {
        if let Some(source) = campaign.utm_source_suppression.as_deref() {
            if matches_utm_source(ctx.referer, source) {
                eval.suppress_forever(HideReason::UtmSource);
            }
        }

        if from_email && settings.suppress_newsletter_campaigns && campaign.is_newsletter_prompt {
            eval.suppress_forever(HideReason::EmailMedium);
        }
    }

    if campaign.is_newsletter_prompt
        && settings.suppress_all_newsletter_campaigns_if_one_dismissed
        && profile.suppressed_newsletter_campaign
    {
        eval.suppress_forever(HideReason::NewsletterDismissed);
    }

    if campaign.is_donation_block
        && settings.suppress_donation_campaigns_if_donor
        && profile.is_donor()
    {
        eval.suppress_forever(HideReason::Donor);
    }

    if let Some(segment) = settings.segment_for(campaign) {
        let outcome = evaluate_segment(segment, &Audience::from_profile(profile, from_email));
        if !outcome.is_match() {
            for rule in &outcome.failed {
                eval.hide(HideReason::Segment(*rule));
            }
        }
        if outcome.suppress_forever {
            eval.record.suppress_forever = true;
        }
    }

    eval.dirty = eval.record != *loaded;
    eval
}
