use serde_json::Value;

use crate::validation::{Schema, Validator, Violation};

use super::OptimizationRequest;

const MIN_CHARS: usize = 10;
const MAX_CHARS: usize = 5000;

impl Schema for OptimizationRequest {
    fn parse(value: &Value) -> Result<OptimizationRequest, Vec<Violation>> {
        let mut v = Validator::root(value)?;

        let campaign_data = v.string("campaignData");
        v.min_chars(
            "campaignData",
            campaign_data.as_deref(),
            MIN_CHARS,
            "Campaign data must be at least 10 characters.",
        );
        v.max_chars(
            "campaignData",
            campaign_data.as_deref(),
            MAX_CHARS,
            "Campaign data is too long.",
        );

        let email_content = v.string("emailContent");
        v.min_chars(
            "emailContent",
            email_content.as_deref(),
            MIN_CHARS,
            "Email content must be at least 10 characters.",
        );
        v.max_chars(
            "emailContent",
            email_content.as_deref(),
            MAX_CHARS,
            "Email content is too long.",
        );

        v.finish(OptimizationRequest {
            campaign_data: campaign_data.unwrap_or_default(),
            email_content: email_content.unwrap_or_default(),
        })
    }
}
