use actix_web::web::{Data, Json, Path};
use actix_web::{delete, get, post, put};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audience::AudienceEstimator;
use crate::database::Database;
use crate::error::Error;
use crate::segment::SegmentId;
use crate::utils::SuccessBody;
use crate::validation;

use super::{manager, Campaign, CampaignId, CampaignStatus};

/// A campaign as the api returns it. `targetSegmentId` is always a
/// `SEG-<UUID>` id, see [`CampaignForm`](super::form::CampaignForm).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBody {
    pub id: CampaignId,
    pub name: String,
    pub subject: String,
    pub email_content: String,
    pub target_segment_id: SegmentId,
    pub target_segment_name: Option<String>,
    pub status: CampaignStatus,
    pub sent_date: Option<NaiveDate>,
    pub created_date: NaiveDate,
    pub audience_size: Option<i64>,
    pub sent_count: Option<i64>,
    pub failed_count: Option<i64>,
    pub open_rate: Option<f64>,
    pub click_rate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl CampaignBody {
    pub fn render(campaign: Campaign) -> CampaignBody {
        CampaignBody {
            id: campaign.id,
            name: campaign.name,
            subject: campaign.subject,
            email_content: campaign.email_content,
            target_segment_id: campaign.target_segment_id,
            target_segment_name: campaign.target_segment_name,
            status: campaign.status,
            sent_date: campaign.sent_date,
            created_date: campaign.created_at.date_naive(),
            audience_size: campaign.audience_size,
            sent_count: campaign.sent_count,
            failed_count: campaign.failed_count,
            open_rate: campaign.open_rate,
            click_rate: campaign.click_rate,
            created_at: campaign.created_at,
            modified_at: campaign.modified_at,
        }
    }
}

#[post("/campaigns")]
#[tracing::instrument(skip(db, estimator))]
pub async fn create_campaign(
    db: Data<Box<dyn Database>>,
    estimator: Data<Box<dyn AudienceEstimator>>,
    body: Json<Value>,
) -> Result<Json<CampaignBody>, Error> {
    let form = validation::validate(&body)?;

    let campaign = manager::create_campaign(&***db, &***estimator, form).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[get("/campaigns")]
#[tracing::instrument(skip(db))]
pub async fn get_campaigns(
    db: Data<Box<dyn Database>>,
) -> Result<Json<Vec<CampaignBody>>, Error> {
    let campaigns = manager::get_campaigns(&***db).await?;

    let body = campaigns.into_iter().map(CampaignBody::render).collect();

    Ok(Json(body))
}

#[get("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let campaign = manager::get_campaign_by_id(&***db, campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[put("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db, estimator))]
pub async fn edit_campaign(
    db: Data<Box<dyn Database>>,
    estimator: Data<Box<dyn AudienceEstimator>>,
    params: Path<CampaignId>,
    body: Json<Value>,
) -> Result<Json<CampaignBody>, Error> {
    let campaign_id = params.into_inner();
    let form = validation::validate(&body)?;

    let campaign = manager::edit_campaign(&***db, &***estimator, campaign_id, form).await?;

    Ok(Json(CampaignBody::render(campaign)))
}

#[delete("/campaigns/{campaign_id}")]
#[tracing::instrument(skip(db))]
pub async fn delete_campaign(
    db: Data<Box<dyn Database>>,
    params: Path<CampaignId>,
) -> Result<Json<SuccessBody>, Error> {
    let campaign_id = params.into_inner();

    manager::delete_campaign(&***db, campaign_id).await?;

    Ok(Json(SuccessBody {}))
}
