use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod form;
pub mod manager;
pub use endpoints::*;

pub type SegmentId = TypedId<Segment>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Segment {
    #[serde(rename = "_id")]
    pub id: SegmentId,
    pub name: String,
    pub description: Option<String>,
    pub criteria: SegmentCriteria,
    pub customer_count: i64,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub modified_at: DateTime<Utc>,
}

impl TypedIdMarker for Segment {
    fn tag() -> &'static str {
        "SEG"
    }
}

// free text shown as-is, there is no query grammar behind these
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentCriteria {
    pub demographics: Option<String>,
    pub purchase_history: Option<String>,
    pub engagement_behavior: Option<String>,
}
