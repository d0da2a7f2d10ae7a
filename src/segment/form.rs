use serde_json::Value;

use crate::validation::{Schema, Validator, Violation};

use super::SegmentCriteria;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentForm {
    pub name: String,
    pub description: Option<String>,
    pub criteria: SegmentCriteria,
}

impl Schema for SegmentForm {
    fn parse(value: &Value) -> Result<SegmentForm, Vec<Violation>> {
        let mut v = Validator::root(value)?;

        let name = v.string("name");
        v.min_chars(
            "name",
            name.as_deref(),
            3,
            "Segment name must be at least 3 characters.",
        );
        let description = v.optional_string("description");

        let mut criteria = SegmentCriteria::default();
        if let Some(mut cv) = v.object("criteria") {
            criteria.demographics = cv.optional_string("demographics");
            criteria.purchase_history = cv.optional_string("purchaseHistory");
            criteria.engagement_behavior = cv.optional_string("engagementBehavior");
            v.absorb(cv);
        }

        v.finish(SegmentForm {
            name: name.unwrap_or_default(),
            description,
            criteria,
        })
    }
}
