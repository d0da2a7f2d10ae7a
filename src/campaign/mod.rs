use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::segment::SegmentId;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod form;
pub mod manager;
pub use endpoints::*;

pub type CampaignId = TypedId<Campaign>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: CampaignId,
    pub name: String,
    pub subject: String,
    pub email_content: String,
    pub target_segment_id: SegmentId,
    // snapshot taken whenever the campaign is written, renaming the segment
    // afterwards does not touch it
    pub target_segment_name: Option<String>,
    pub status: CampaignStatus,
    pub sent_date: Option<NaiveDate>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
    pub audience_size: Option<i64>,
    pub sent_count: Option<i64>,
    pub failed_count: Option<i64>,
    pub open_rate: Option<f64>,
    pub click_rate: Option<f64>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

/// `Sent` and `Archived` only ever arrive from outside (seeded or imported
/// records); nothing in this crate moves a campaign into them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sent,
    Archived,
}

impl CampaignStatus {
    pub fn for_new_campaign(send_date: Option<NaiveDate>) -> CampaignStatus {
        match send_date {
            Some(_) => CampaignStatus::Scheduled,
            None => CampaignStatus::Draft,
        }
    }

    /// A draft becomes scheduled once it gets a send date. Every other status
    /// is kept as-is, so a scheduled campaign never falls back to draft.
    pub fn after_edit(self, send_date: Option<NaiveDate>) -> CampaignStatus {
        match (self, send_date) {
            (CampaignStatus::Draft, Some(_)) => CampaignStatus::Scheduled,
            (status, _) => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn date() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 7, 25)
    }

    #[test]
    fn new_campaigns_are_scheduled_only_with_a_date() {
        assert_eq!(CampaignStatus::for_new_campaign(None), CampaignStatus::Draft);
        assert_eq!(
            CampaignStatus::for_new_campaign(date()),
            CampaignStatus::Scheduled
        );
    }

    #[test]
    fn drafts_are_promoted_by_a_date() {
        assert_eq!(
            CampaignStatus::Draft.after_edit(date()),
            CampaignStatus::Scheduled
        );
        assert_eq!(CampaignStatus::Draft.after_edit(None), CampaignStatus::Draft);
    }

    fn any_status() -> impl Strategy<Value = CampaignStatus> {
        prop_oneof![
            Just(CampaignStatus::Draft),
            Just(CampaignStatus::Scheduled),
            Just(CampaignStatus::Sent),
            Just(CampaignStatus::Archived),
        ]
    }

    fn any_send_date() -> impl Strategy<Value = Option<NaiveDate>> {
        prop::option::of((0i64..3650).prop_map(|days| {
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(days)
        }))
    }

    proptest! {
        #[test]
        fn edits_never_demote(
            status in any_status(),
            edits in prop::collection::vec(any_send_date(), 0..8),
        ) {
            let mut current = status;
            for send_date in edits {
                let next = current.after_edit(send_date);
                prop_assert!(
                    !(current == CampaignStatus::Scheduled && next == CampaignStatus::Draft)
                );
                if current != CampaignStatus::Draft {
                    prop_assert_eq!(next, current);
                }
                current = next;
            }
        }
    }
}
