use crate::models::campaign::Segment;
use crate::models::client::ClientProfile;

/// What the segment checks need to know about the visitor on this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audience {
    pub posts_read: usize,
    pub is_subscriber: bool,
    pub is_donor: bool,
    /// The referer carried `utm_medium=email`.
    pub arrived_from_email: bool,
}

impl Audience {
    /// Arriving from an email link counts as being subscribed.
    pub fn from_profile(profile: &ClientProfile, arrived_from_email: bool) -> Self {
        Self {
            posts_read: profile.posts_read_count(),
            is_subscriber: profile.has_email_subscription() || arrived_from_email,
            is_donor: profile.is_donor(),
            arrived_from_email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentRule {
    MinPosts,
    MaxPosts,
    IsSubscribed,
    IsNotSubscribed,
    IsDonor,
    IsNotDonor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentOutcome {
    pub failed: Vec<SegmentRule>,
    pub suppress_forever: bool,
}

impl SegmentOutcome {
    pub fn is_match(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Checks every constraint of `segment` independently; all must hold.
///
/// Only `is_not_subscribed` can make the suppression permanent, and only when the
/// visitor counts as a subscriber because they came in from an email link.
pub fn evaluate_segment(segment: &Segment, audience: &Audience) -> SegmentOutcome {
    let mut outcome = SegmentOutcome::default();
    let posts_read = audience.posts_read as u64;

    if segment.min_posts > 0 && posts_read < u64::from(segment.min_posts) {
        outcome.failed.push(SegmentRule::MinPosts);
    }
    if segment.max_posts > 0 && posts_read > u64::from(segment.max_posts) {
        outcome.failed.push(SegmentRule::MaxPosts);
    }
    if segment.is_subscribed && !audience.is_subscriber {
        outcome.failed.push(SegmentRule::IsSubscribed);
    }
    if segment.is_not_subscribed && audience.is_subscriber {
        outcome.failed.push(SegmentRule::IsNotSubscribed);
        if audience.arrived_from_email {
            outcome.suppress_forever = true;
        }
    }
    if segment.is_donor && !audience.is_donor {
        outcome.failed.push(SegmentRule::IsDonor);
    }
    if segment.is_not_donor && audience.is_donor {
        outcome.failed.push(SegmentRule::IsNotDonor);
    }

    outcome
}
