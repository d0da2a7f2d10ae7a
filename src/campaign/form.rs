use chrono::NaiveDate;
use serde_json::Value;

use crate::segment::SegmentId;
use crate::validation::{Schema, Validator, Violation};

/// The fields a client sends to create or edit a campaign.
///
/// `targetSegmentId` has to be a segment id issued by this service
/// (`SEG-<UUID>`). External or legacy ids such as `"2"` are rejected with
/// "Target segment id is not valid." instead of being stored unresolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignForm {
    pub name: String,
    pub subject: String,
    pub target_segment_id: SegmentId,
    pub email_content: String,
    pub send_date: Option<NaiveDate>,
}

impl Schema for CampaignForm {
    fn parse(value: &Value) -> Result<CampaignForm, Vec<Violation>> {
        let mut v = Validator::root(value)?;

        let name = v.string("name");
        v.min_chars(
            "name",
            name.as_deref(),
            3,
            "Campaign name must be at least 3 characters.",
        );

        let subject = v.string("subject");
        v.min_chars(
            "subject",
            subject.as_deref(),
            5,
            "Subject line must be at least 5 characters.",
        );

        let target = v.string("targetSegmentId");
        v.min_chars(
            "targetSegmentId",
            target.as_deref(),
            1,
            "Target segment is required.",
        );
        // the segment doesn't have to exist, but the id has to be one
        let target_segment_id = match target.as_deref() {
            Some("") | None => None,
            Some(target) => match target.parse::<SegmentId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    v.violation("targetSegmentId", "Target segment id is not valid.");
                    None
                }
            },
        };

        let email_content = v.string("emailContent");
        v.min_chars(
            "emailContent",
            email_content.as_deref(),
            20,
            "Email content must be at least 20 characters.",
        );

        let send_date = v.optional_date("sendDate");

        v.finish(CampaignForm {
            name: name.unwrap_or_default(),
            subject: subject.unwrap_or_default(),
            target_segment_id: target_segment_id.unwrap_or_default(),
            email_content: email_content.unwrap_or_default(),
            send_date,
        })
    }
}
