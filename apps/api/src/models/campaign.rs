use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::de::{lenient_u32, optional_string_or_number, string_or_number};

/// How often a campaign may be re-displayed to the same visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Once,
    Always,
    /// Also covers any value we do not recognise.
    #[default]
    Never,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Once => "once",
            Frequency::Always => "always",
            Frequency::Never => "never",
        }
    }
}

impl From<String> for Frequency {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "once" => Frequency::Once,
            "always" => Frequency::Always,
            _ => Frequency::Never,
        }
    }
}

impl From<Frequency> for String {
    fn from(value: Frequency) -> Self {
        value.as_str().to_string()
    }
}

/// Per-request campaign configuration.
///
/// Wire keys follow the compact access payload (`id`, `f`, `n`, `d`, `utm`, `s`);
/// the descriptive names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "f", alias = "frequency", default)]
    pub frequency: Frequency,
    #[serde(rename = "n", alias = "is_newsletter_prompt", default)]
    pub is_newsletter_prompt: bool,
    #[serde(rename = "d", alias = "is_donation_block", default)]
    pub is_donation_block: bool,
    #[serde(
        rename = "utm",
        alias = "utm_source_suppression",
        alias = "utm_suppression",
        default,
        deserialize_with = "optional_string_or_number"
    )]
    pub utm_source_suppression: Option<String>,
    #[serde(
        rename = "s",
        alias = "segment_id",
        alias = "segmentation",
        default,
        deserialize_with = "optional_string_or_number"
    )]
    pub segment_id: Option<String>,
}

#[cfg(test)]
impl CampaignConfig {
    pub fn new(id: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            id: id.into(),
            frequency,
            is_newsletter_prompt: false,
            is_donation_block: false,
            utm_source_suppression: None,
            segment_id: None,
        }
    }
}

/// Audience constraints. Zero / `false` means the constraint is not enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default, deserialize_with = "lenient_u32")]
    pub min_posts: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub max_posts: u32,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub is_not_subscribed: bool,
    #[serde(default)]
    pub is_donor: bool,
    #[serde(default)]
    pub is_not_donor: bool,
}

/// Site-wide toggles and the segment catalogue, snapshotted per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default)]
    pub suppress_newsletter_campaigns: bool,
    #[serde(default)]
    pub suppress_all_newsletter_campaigns_if_one_dismissed: bool,
    #[serde(default)]
    pub suppress_donation_campaigns_if_donor: bool,
    #[serde(default)]
    pub all_segments: HashMap<String, Segment>,
}

impl SiteSettings {
    /// Resolves the campaign's segment, if it names one that exists.
    pub fn segment_for(&self, campaign: &CampaignConfig) -> Option<&Segment> {
        campaign
            .segment_id
            .as_deref()
            .and_then(|id| self.all_segments.get(id))
    }
}
