use chrono::Utc;

use crate::audience::AudienceEstimator;
use crate::database::Database;
use crate::error::Error;
use crate::segment::{Segment, SegmentId};

use super::form::CampaignForm;
use super::{Campaign, CampaignId, CampaignStatus};

async fn find_target_segment(
    db: &dyn Database,
    segment_id: SegmentId,
) -> Result<Option<Segment>, Error> {
    db.segments().fetch_segment_by_id(segment_id).await
}

#[tracing::instrument(skip(db, estimator))]
pub async fn create_campaign(
    db: &dyn Database,
    estimator: &dyn AudienceEstimator,
    form: CampaignForm,
) -> Result<Campaign, Error> {
    let segment = find_target_segment(db, form.target_segment_id).await?;
    let target_segment_name = segment.map(|segment| segment.name);

    let audience_size = match &target_segment_name {
        Some(name) => Some(estimator.estimate_audience(Some(name)).await?),
        None => None,
    };

    let now = Utc::now();
    let campaign = Campaign {
        id: CampaignId::new(),
        name: form.name,
        subject: form.subject,
        email_content: form.email_content,
        target_segment_id: form.target_segment_id,
        target_segment_name,
        status: CampaignStatus::for_new_campaign(form.send_date),
        sent_date: form.send_date,
        created_at: now,
        modified_at: now,
        audience_size,
        sent_count: Some(0),
        failed_count: Some(0),
        open_rate: None,
        click_rate: None,
    };

    db.campaigns().insert_campaign(&campaign).await?;

    Ok(campaign)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaigns(db: &dyn Database) -> Result<Vec<Campaign>, Error> {
    let campaigns = db.campaigns().fetch_campaigns().await?;

    Ok(campaigns)
}

#[tracing::instrument(skip(db))]
pub async fn get_campaign_by_id(
    db: &dyn Database,
    campaign_id: CampaignId,
) -> Result<Option<Campaign>, Error> {
    let campaign = db.campaigns().fetch_campaign_by_id(campaign_id).await?;

    Ok(campaign)
}

/// Merges the form into the stored campaign. The segment name snapshot and
/// audience size are taken again from the current segment; the send date is
/// whatever the form says, including nothing.
#[tracing::instrument(skip(db, estimator))]
pub async fn edit_campaign(
    db: &dyn Database,
    estimator: &dyn AudienceEstimator,
    campaign_id: CampaignId,
    form: CampaignForm,
) -> Result<Campaign, Error> {
    let mut campaign = db
        .campaigns()
        .fetch_campaign_by_id(campaign_id)
        .await?
        .ok_or(Error::CampaignNotFound { campaign_id })?;

    let segment = find_target_segment(db, form.target_segment_id).await?;
    let target_segment_name = segment.map(|segment| segment.name);

    if campaign.audience_size.is_some() || target_segment_name.is_some() {
        let estimate = estimator
            .estimate_audience(target_segment_name.as_deref())
            .await?;
        campaign.audience_size = Some(estimate);
    }

    campaign.status = campaign.status.after_edit(form.send_date);
    campaign.name = form.name;
    campaign.subject = form.subject;
    campaign.email_content = form.email_content;
    campaign.target_segment_id = form.target_segment_id;
    campaign.target_segment_name = target_segment_name;
    campaign.sent_date = form.send_date;

    db.campaigns().update_campaign(campaign).await
}

#[tracing::instrument(skip(db))]
pub async fn delete_campaign(db: &dyn Database, campaign_id: CampaignId) -> Result<(), Error> {
    db.campaigns().delete_campaign(campaign_id).await
}
